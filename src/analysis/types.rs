use serde::{Deserialize, Serialize};

/// Structured nutrition breakdown parsed from the model's response.
///
/// Immutable once parsed; this is the value cached and handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionData {
    #[serde(rename = "food_items")]
    pub food_items: Vec<FoodItem>,

    #[serde(rename = "total_nutrition")]
    pub total_nutrition: TotalNutrition,
}

/// One recognized food item with estimated quantities and macros
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,

    /// Model confidence for this item, 0.0 to 1.0
    pub confidence: f64,

    /// Ingredient database match, when the model found one
    #[serde(rename = "matched_ingredient_id", default)]
    pub matched_ingredient_id: Option<String>,
}

/// Macro totals across all recognized items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
}

/// Chat completion request payload
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,

    #[serde(rename = "max_tokens")]
    pub max_tokens: u32,

    #[serde(rename = "response_format")]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// Chat completion response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,

    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessage,

    #[serde(rename = "finish_reason", default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    #[serde(rename = "prompt_tokens")]
    pub prompt_tokens: u32,

    #[serde(rename = "completion_tokens")]
    pub completion_tokens: u32,

    #[serde(rename = "total_tokens")]
    pub total_tokens: u32,
}
