//! Azure OpenAI chat completions.
//!
//! Requests go to
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}`
//! with the key in the `api-key` header. The deployment selects the model, so
//! the body carries only the messages.

use super::{require, send_completion, ChatMessage, ChatModel, CompletionRequest};
use crate::error::DigestError;
use reqwest::Client;
use std::fmt;
use tracing::{debug, instrument};
use url::Url;

#[derive(Clone)]
pub struct AzureChat {
    client: Client,
    api_key: String,
    completions_url: Url,
    deployment: String,
}

/// Credentials and resource coordinates of one Azure OpenAI deployment.
#[derive(Debug, Clone, Default)]
pub struct AzureSettings<'a> {
    pub api_key: &'a str,
    pub endpoint: &'a str,
    pub api_version: &'a str,
    pub deployment: &'a str,
}

impl AzureChat {
    pub fn new(settings: AzureSettings<'_>) -> Result<Self, DigestError> {
        let api_key = require(settings.api_key, "Azure OpenAI API key")?;
        let endpoint = require(settings.endpoint, "Azure OpenAI endpoint")?;
        let api_version = require(settings.api_version, "Azure OpenAI API version")?;
        let deployment = require(settings.deployment, "Azure OpenAI deployment name")?;

        let mut completions_url = Url::parse(&format!(
            "{}/openai/deployments/{}/chat/completions",
            endpoint.trim_end_matches('/'),
            deployment
        ))
        .map_err(|e| DigestError::Configuration(format!("invalid Azure OpenAI endpoint: {e}")))?;
        completions_url
            .query_pairs_mut()
            .append_pair("api-version", &api_version);

        Ok(Self {
            client: Client::new(),
            api_key,
            completions_url,
            deployment,
        })
    }

    pub fn completions_url(&self) -> &Url {
        &self.completions_url
    }
}

impl fmt::Debug for AzureChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureChat")
            .field("api_key", &"<redacted>")
            .field("completions_url", &self.completions_url.as_str())
            .field("deployment", &self.deployment)
            .finish()
    }
}

impl ChatModel for AzureChat {
    fn name(&self) -> &str {
        "azure"
    }

    #[instrument(level = "debug", skip_all, fields(deployment = %self.deployment))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, DigestError> {
        debug!(url = %self.completions_url(), messages = messages.len(), "Sending Azure completion");
        let request = self
            .client
            .post(self.completions_url.clone())
            .header("api-key", &self.api_key);
        let body = CompletionRequest {
            model: None,
            messages,
        };
        send_completion(request, &body).await
    }
}
