//! YAML configuration for the digest server.
//!
//! Every section is optional; a missing file or a partial file falls back to
//! the defaults below. CLI flags are applied on top by [`crate::cli::Cli`].
//!
//! ```yaml
//! server:
//!   bind: 127.0.0.1:8501
//! search:
//!   endpoint: https://api.tavily.com/search
//!   max_results: 20
//! model:
//!   provider: groq
//!   groq:
//!     models: [openai/gpt-oss-20b, openai/gpt-oss-120b]
//! digest:
//!   timezone: IST
//!   timeframes: [Daily, Weekly, Monthly]
//!   default_timeframe: Weekly
//! ```

use crate::api::ProviderKind;
use crate::models::Timeframe;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

pub const DEFAULT_QUERY: &str = "Top Artificial Intelligence (AI) technology news India and globally";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub model: ModelConfig,
    pub digest: DigestConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
        }
    }
}

/// Parameters of the single search request issued per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub query: String,
    pub topic: String,
    pub max_results: u32,
    pub include_answer: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            query: DEFAULT_QUERY.to_string(),
            topic: "news".to_string(),
            max_results: 20,
            include_answer: "advanced".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub groq: GroqConfig,
    pub azure: AzureConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqConfig {
    pub base_url: String,
    /// Models offered in the form; the first one is preselected.
    pub models: Vec<String>,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            models: vec![
                "openai/gpt-oss-20b".to_string(),
                "openai/gpt-oss-120b".to_string(),
            ],
        }
    }
}

impl GroqConfig {
    pub fn default_model(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }
}

/// Azure OpenAI resource settings. Blank values must be supplied in the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub endpoint: String,
    pub api_version: String,
    pub deployment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Timezone the model is told to normalize dates to.
    pub timezone: String,
    /// Timeframes offered in the form.
    pub timeframes: Vec<Timeframe>,
    pub default_timeframe: Timeframe,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            timezone: "IST".to_string(),
            timeframes: vec![Timeframe::Daily, Timeframe::Weekly, Timeframe::Monthly],
            default_timeframe: Timeframe::Weekly,
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load a config file, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let text = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&text)?;
        info!(path = %path.display(), provider = %config.model.provider, "Loaded configuration");
        Ok(config)
    }
}
