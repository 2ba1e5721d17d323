//! Groq chat completions (OpenAI-compatible API).

use super::{require, send_completion, ChatMessage, ChatModel, CompletionRequest};
use crate::error::DigestError;
use reqwest::Client;
use std::fmt;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct GroqChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqChat {
    /// Build a Groq client. The key and model must be non-blank.
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self, DigestError> {
        Ok(Self {
            client: Client::new(),
            api_key: require(api_key, "Groq API key")?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: require(model, "Groq model")?,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl fmt::Debug for GroqChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqChat")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatModel for GroqChat {
    fn name(&self) -> &str {
        "groq"
    }

    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, DigestError> {
        let url = self.completions_url();
        debug!(%url, messages = messages.len(), "Sending Groq completion");
        let request = self.client.post(url).bearer_auth(&self.api_key);
        let body = CompletionRequest {
            model: Some(&self.model),
            messages,
        };
        send_completion(request, &body).await
    }
}
