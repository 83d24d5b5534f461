use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::analysis::AnalysisSettings;
use crate::search::SearchSettings;
use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub network: NetworkConfig,
    pub analysis: AnalysisConfig,
    pub search: SearchConfig,
    pub recording: RecordingConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub assume_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub api_key_account: String,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    pub fetch_limit: usize,
    pub default_limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecordingConfig {
    pub silence_timeout_secs: u64,
    pub context_limit: usize,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            endpoint: self.analysis.endpoint.clone(),
            model: self.analysis.model.clone(),
            temperature: self.analysis.temperature,
            max_tokens: self.analysis.max_tokens,
            api_key_account: self.analysis.api_key_account.clone(),
            cache_ttl: Duration::from_secs(self.analysis.cache_ttl_secs),
            cache_max_entries: self.analysis.cache_max_entries,
        }
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            fetch_limit: self.search.fetch_limit,
            default_limit: self.search.default_limit,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            silence_timeout: Duration::from_secs(self.recording.silence_timeout_secs),
            context_limit: self.recording.context_limit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "nutrivoice".to_string(),
            },
            network: NetworkConfig {
                request_timeout_secs: 30,
                assume_connected: true,
            },
            analysis: AnalysisConfig {
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                model: "gpt-4o-turbo".to_string(),
                temperature: 0.3,
                max_tokens: 500,
                api_key_account: "openai_api_key".to_string(),
                cache_ttl_secs: 24 * 60 * 60,
                cache_max_entries: 100,
            },
            search: SearchConfig {
                fetch_limit: 1000,
                default_limit: 20,
            },
            recording: RecordingConfig {
                silence_timeout_secs: 2,
                context_limit: 5,
            },
        }
    }
}
