//! Language model collaborators.
//!
//! The summarizer talks to a model through the [`ChatModel`] trait. Two
//! providers implement it, both speaking the OpenAI chat-completions wire
//! format:
//! - [`groq::GroqChat`]: Groq's OpenAI-compatible endpoint, bearer auth
//! - [`azure::AzureChat`]: an Azure OpenAI deployment, `api-key` header
//!
//! [`ModelProvider`] wraps either one so the pipeline stays a single code path
//! and the provider is chosen by configuration ([`ProviderKind`]).

pub mod azure;
pub mod groq;

use crate::error::DigestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{info, instrument, warn};

pub use azure::AzureChat;
pub use groq::GroqChat;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for async chat completion.
///
/// Implementors send a list of messages to a model and return the text of
/// the first completion choice, unmodified.
pub trait ChatModel {
    /// Short provider label used in logs.
    fn name(&self) -> &str;

    fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, DigestError>> + Send;
}

/// Which model provider the server is configured for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Groq,
    Azure,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Groq => f.write_str("groq"),
            ProviderKind::Azure => f.write_str("azure"),
        }
    }
}

/// A configured model provider.
#[derive(Debug, Clone)]
pub enum ModelProvider {
    Groq(GroqChat),
    Azure(AzureChat),
}

impl ModelProvider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ModelProvider::Groq(_) => ProviderKind::Groq,
            ModelProvider::Azure(_) => ProviderKind::Azure,
        }
    }
}

impl ChatModel for ModelProvider {
    fn name(&self) -> &str {
        match self {
            ModelProvider::Groq(inner) => inner.name(),
            ModelProvider::Azure(inner) => inner.name(),
        }
    }

    #[instrument(level = "info", skip_all, fields(provider = %self.kind()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, DigestError> {
        let t0 = Instant::now();
        let res = match self {
            ModelProvider::Groq(inner) => inner.complete(messages).await,
            ModelProvider::Azure(inner) => inner.complete(messages).await,
        };
        let dt = t0.elapsed();

        match &res {
            Ok(text) => info!(
                elapsed_ms = dt.as_millis() as u64,
                bytes = text.len(),
                "Model call succeeded"
            ),
            Err(e) => warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "Model call failed"),
        }
        res
    }
}

/// OpenAI chat-completions request body. `model` is omitted for Azure, where
/// the deployment in the URL selects the model.
#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice. A missing choice is an error; a null
    /// content is returned as empty text.
    pub(crate) fn into_text(self) -> Result<String, DigestError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| DigestError::Model("response contained no choices".to_string()))
    }
}

/// Send a completion request and decode the first choice.
pub(crate) async fn send_completion(
    request: reqwest::RequestBuilder,
    body: &CompletionRequest<'_>,
) -> Result<String, DigestError> {
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| DigestError::Model(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DigestError::Model(format!("API error {status}: {body}")));
    }

    response
        .json::<CompletionResponse>()
        .await
        .map_err(|e| DigestError::Model(format!("failed to parse response: {e}")))?
        .into_text()
}

pub(crate) fn require(value: &str, what: &str) -> Result<String, DigestError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DigestError::Configuration(format!("{what} is required")));
    }
    Ok(value.to_string())
}
