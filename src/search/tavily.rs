//! Tavily search API client.
//!
//! One `POST` to the configured endpoint per run. The key is sent both in
//! the body (`api_key`) and as a bearer token, which the API accepts either
//! way.

use super::{NewsSearch, SearchRequest};
use crate::error::DigestError;
use crate::models::ArticleRecord;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct TavilyClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    #[serde(flatten)]
    search: &'a SearchRequest,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Option<Vec<ArticleRecord>>,
}

impl TavilyClient {
    pub fn new(api_key: &str, endpoint: &str) -> Result<Self, DigestError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(DigestError::Configuration(
                "Tavily API key is required".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        })
    }
}

impl fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TavilyClient")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl NewsSearch for TavilyClient {
    #[instrument(level = "info", skip_all, fields(time_range = request.time_range, days = request.days))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ArticleRecord>, DigestError> {
        let body = TavilyRequest {
            api_key: &self.api_key,
            search: request,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DigestError::Search(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %truncate_for_log(&body, 300), "Tavily returned an error");
            return Err(DigestError::Search(format!("Tavily API error {status}: {body}")));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| DigestError::Search(format!("failed to parse Tavily response: {e}")))?;

        if let Some(answer) = &parsed.answer {
            debug!(answer = %truncate_for_log(answer, 200), "Tavily synthesized answer (unused)");
        }
        Ok(parsed.results.unwrap_or_default())
    }
}
