//! The two-step digest pipeline: fetch, then summarize.
//!
//! Each step reads the current [`PipelineState`] and returns a
//! [`StateDelta`]; the pipeline merges it into the next state value. There is
//! no branching and no resumption from a partial state: either both steps
//! complete or the run fails with the first error.

use crate::api::ChatModel;
use crate::config::SearchConfig;
use crate::error::DigestError;
use crate::models::{PipelineState, StateDelta, Timeframe};
use crate::search::{self, NewsSearch};
use crate::summarizer;
use std::time::Instant;
use tracing::{error, info, instrument};

/// A pipeline bound to one search collaborator and one model collaborator.
#[derive(Debug)]
pub struct DigestPipeline<S, M> {
    search: S,
    model: M,
    search_settings: SearchConfig,
    timezone: String,
}

impl<S, M> DigestPipeline<S, M>
where
    S: NewsSearch,
    M: ChatModel,
{
    pub fn new(search: S, model: M, search_settings: SearchConfig, timezone: impl Into<String>) -> Self {
        Self {
            search,
            model,
            search_settings,
            timezone: timezone.into(),
        }
    }

    /// Fetch step: query the search collaborator for the state's timeframe.
    pub async fn fetch_news(&self, state: &PipelineState) -> Result<StateDelta, DigestError> {
        let raw_articles = search::fetch(&self.search, &self.search_settings, state.timeframe).await?;
        Ok(StateDelta::Fetched { raw_articles })
    }

    /// Summarize step: compress the fetched articles into a digest.
    pub async fn summarize_news(&self, state: &PipelineState) -> Result<StateDelta, DigestError> {
        let summary = summarizer::summarize(&self.model, &state.raw_articles, &self.timezone).await?;
        Ok(StateDelta::Summarized { summary })
    }

    /// Run both steps for `timeframe` and return the final state.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, timeframe: Timeframe) -> Result<PipelineState, DigestError> {
        let t0 = Instant::now();
        let state = PipelineState::new(timeframe);

        let result = async {
            let delta = self.fetch_news(&state).await?;
            let state = state.merge(delta)?;
            let delta = self.summarize_news(&state).await?;
            state.merge(delta)
        }
        .await;

        let elapsed_ms = t0.elapsed().as_millis() as u64;
        match &result {
            Ok(done) => info!(
                elapsed_ms,
                articles = done.raw_articles.len(),
                summary_bytes = done.summary.len(),
                "Digest run complete"
            ),
            Err(e) => error!(elapsed_ms, error = %e, "Digest run failed"),
        }
        result
    }
}
