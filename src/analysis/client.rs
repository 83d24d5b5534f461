use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::network::{NetworkError, ResilientHttpClient};
use crate::secrets::SecretStore;

use super::cache::ResponseCache;
use super::types::{ChatMessage, ChatRequest, ChatResponse, NutritionData, ResponseFormat};

/// Errors from the nutrition analysis layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("API key not configured")]
    NoApiKey,

    #[error("invalid response from completion endpoint")]
    InvalidResponse,

    #[error("failed to parse nutritional data")]
    ParsingError,

    #[error("API error: {0}")]
    ApiError(String),
}

/// Settings for the completion endpoint and the response cache
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,

    /// Secret store account holding the API key
    pub api_key_account: String,

    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-turbo".to_string(),
            temperature: 0.3,
            max_tokens: 500,
            api_key_account: "openai_api_key".to_string(),
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            cache_max_entries: 100,
        }
    }
}

/// Turns a free-form food description into structured [`NutritionData`] by
/// prompting a chat completion endpoint, with a TTL cache in front of the
/// network.
pub struct NutritionAnalysisClient {
    http: Arc<ResilientHttpClient>,
    secrets: Arc<dyn SecretStore>,
    cache: ResponseCache,
    settings: AnalysisSettings,
}

impl NutritionAnalysisClient {
    pub fn new(
        http: Arc<ResilientHttpClient>,
        secrets: Arc<dyn SecretStore>,
        settings: AnalysisSettings,
    ) -> Self {
        let cache = ResponseCache::new(settings.cache_ttl, settings.cache_max_entries);
        Self {
            http,
            secrets,
            cache,
            settings,
        }
    }

    /// Analyze a food description against the (possibly empty) ingredient
    /// context.
    ///
    /// Cache hits return without touching the secret store or the network.
    pub async fn analyze(
        &self,
        description: &str,
        ingredient_context: &[String],
    ) -> Result<NutritionData, AnalysisError> {
        let cache_key = description.to_lowercase();

        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!("Analysis cache hit for '{}'", cache_key);
            return Ok(cached);
        }

        let api_key = self
            .secrets
            .get(&self.settings.api_key_account)
            .await
            .map_err(|_| AnalysisError::NoApiKey)?;

        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(build_system_prompt(ingredient_context)),
                ChatMessage::user(description),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            response_format: ResponseFormat::json_object(),
        };

        let headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), format!("Bearer {api_key}")),
        ];

        let envelope: ChatResponse = self
            .http
            .post_json(&self.settings.endpoint, &headers, &request)
            .await
            .map_err(|error| match error {
                NetworkError::Decode(_) => AnalysisError::InvalidResponse,
                other => AnalysisError::ApiError(other.to_string()),
            })?;

        let content = envelope
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or(AnalysisError::InvalidResponse)?;

        let nutrition: NutritionData =
            serde_json::from_str(content).map_err(|_| AnalysisError::ParsingError)?;

        info!(
            "Analyzed '{}': {} items, {:.0} kcal total",
            description,
            nutrition.food_items.len(),
            nutrition.total_nutrition.calories
        );

        self.cache.insert(cache_key, nutrition.clone()).await;

        Ok(nutrition)
    }

    /// Number of cached analyses (test and diagnostics hook)
    pub async fn cached_count(&self) -> usize {
        self.cache.len().await
    }
}

/// Fixed prompt template embedding the ingredient context and the strict
/// JSON schema the response must follow.
fn build_system_prompt(ingredient_context: &[String]) -> String {
    let ingredient_list = if ingredient_context.is_empty() {
        "No specific ingredients provided".to_string()
    } else {
        ingredient_context.join(", ")
    };

    format!(
        r#"You are a nutritional analysis assistant for a calorie tracking app.
Your task is to parse natural language food descriptions and return structured nutritional data in JSON format.

CUSTOM INGREDIENT DATABASE:
{ingredient_list}

USER INPUT RULES:
1. Match user descriptions to custom ingredients when possible
2. Use "matched_ingredient_id" field when match found
3. Estimate quantities if not specified (use common serving sizes)
4. Provide confidence score (0.0-1.0) for each food item
5. If no custom ingredient matches, use general nutritional knowledge
6. Always return valid JSON in the specified format

RESPONSE FORMAT:
{{
  "food_items": [
    {{
      "name": "string",
      "quantity": number,
      "unit": "string",
      "calories": number,
      "protein": number,
      "carbohydrates": number,
      "fat": number,
      "confidence": number,
      "matched_ingredient_id": "string or null"
    }}
  ],
  "total_nutrition": {{
    "calories": number,
    "protein": number,
    "carbohydrates": number,
    "fat": number
  }}
}}"#
    )
}
