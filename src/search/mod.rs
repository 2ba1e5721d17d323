//! News search collaborators and the fetch step.
//!
//! The fetch step turns a [`Timeframe`] into exactly one search request and
//! hands back whatever the service returned, in order:
//!
//! | Timeframe | `time_range` | `days` |
//! |-----------|--------------|--------|
//! | Daily     | `d`          | 1      |
//! | Weekly    | `w`          | 7      |
//! | Monthly   | `m`          | 30     |
//! | Yearly    | `y`          | 365    |
//!
//! No filtering, scoring or deduplication happens locally.

pub mod tavily;

use crate::config::SearchConfig;
use crate::error::DigestError;
use crate::models::{ArticleRecord, Timeframe};
use serde::Serialize;
use tracing::{info, instrument};

pub use tavily::TavilyClient;

/// Parameters of one news search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub topic: String,
    pub time_range: &'static str,
    pub days: u32,
    pub max_results: u32,
    pub include_answer: String,
}

impl SearchRequest {
    pub fn for_timeframe(settings: &SearchConfig, timeframe: Timeframe) -> Self {
        Self {
            query: settings.query.clone(),
            topic: settings.topic.clone(),
            time_range: timeframe.recency_code(),
            days: timeframe.max_age_days(),
            max_results: settings.max_results,
            include_answer: settings.include_answer.clone(),
        }
    }
}

/// A service that can answer a news search.
pub trait NewsSearch {
    /// Issue one search and return the result records as the service ranked them.
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Vec<ArticleRecord>, DigestError>> + Send;
}

/// Fetch the raw articles for a timeframe.
#[instrument(level = "info", skip(search, settings))]
pub async fn fetch<S: NewsSearch>(
    search: &S,
    settings: &SearchConfig,
    timeframe: Timeframe,
) -> Result<Vec<ArticleRecord>, DigestError> {
    let request = SearchRequest::for_timeframe(settings, timeframe);
    let articles = search.search(&request).await?;
    info!(
        count = articles.len(),
        time_range = request.time_range,
        days = request.days,
        "Fetched news articles"
    );
    Ok(articles)
}
