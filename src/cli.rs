//! Command-line interface definitions for the digest server.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials can be provided via flags or environment variables; anything
//! given here becomes the fallback for blank fields in the web form.

use crate::api::ProviderKind;
use crate::config::Config;
use crate::web::Credentials;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the AI news digest server.
///
/// # Examples
///
/// ```sh
/// # Groq, keys typed into the form
/// ai_news_digest
///
/// # Azure OpenAI with a config file and keys from the environment
/// AZURE_OPENAI_API_KEY=... TAVILY_API_KEY=... ai_news_digest -c digest.yaml --provider azure
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long, env = "DIGEST_BIND")]
    pub bind: Option<String>,

    /// Model provider (overrides `model.provider`)
    #[arg(short, long, value_enum, env = "DIGEST_PROVIDER")]
    pub provider: Option<ProviderKind>,

    /// Tavily API key
    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub tavily_api_key: Option<String>,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    /// Azure OpenAI API key
    #[arg(long, env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
    pub azure_api_key: Option<String>,

    /// Azure OpenAI endpoint URI (overrides `model.azure.endpoint`)
    #[arg(long, env = "AZURE_OPENAI_ENDPOINT")]
    pub azure_endpoint: Option<String>,

    /// Azure OpenAI API version (overrides `model.azure.api_version`)
    #[arg(long, env = "AZURE_OPENAI_API_VERSION")]
    pub azure_api_version: Option<String>,

    /// Azure OpenAI deployment name (overrides `model.azure.deployment`)
    #[arg(long, env = "AZURE_OPENAI_DEPLOYMENT")]
    pub azure_deployment: Option<String>,
}

impl Cli {
    /// Apply flag overrides to a loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(provider) = self.provider {
            config.model.provider = provider;
        }
        let azure = &mut config.model.azure;
        if let Some(endpoint) = &self.azure_endpoint {
            azure.endpoint = endpoint.clone();
        }
        if let Some(version) = &self.azure_api_version {
            azure.api_version = version.clone();
        }
        if let Some(deployment) = &self.azure_deployment {
            azure.deployment = deployment.clone();
        }
    }

    /// Fallback credentials for blank form fields.
    pub fn default_credentials(&self, config: &Config) -> Credentials {
        Credentials {
            tavily_api_key: self.tavily_api_key.clone().unwrap_or_default(),
            groq_api_key: self.groq_api_key.clone().unwrap_or_default(),
            groq_model: config.model.groq.default_model().unwrap_or_default().to_string(),
            azure_api_key: self.azure_api_key.clone().unwrap_or_default(),
            azure_endpoint: config.model.azure.endpoint.clone(),
            azure_api_version: config.model.azure.api_version.clone(),
            azure_deployment: config.model.azure.deployment.clone(),
        }
    }
}
