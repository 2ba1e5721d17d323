//! Data models for a single digest run.
//!
//! This module defines the core data structures threaded through the pipeline:
//! - [`Timeframe`]: The closed set of recency windows a user can pick
//! - [`ArticleRecord`]: One raw search result (content, URL, publish date)
//! - [`PipelineState`]: The state value produced by each pipeline step
//! - [`StateDelta`]: What a single step contributes to the state
//!
//! All of these live only for the duration of one run; nothing is persisted.

use crate::error::DigestError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The recency window a digest covers.
///
/// Each variant maps to exactly one search recency code and one maximum
/// article age, so an unsupported window can only appear while parsing user
/// input (see [`FromStr`]), never deeper in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Timeframe {
    /// Every supported timeframe, in increasing window size.
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Daily,
        Timeframe::Weekly,
        Timeframe::Monthly,
        Timeframe::Yearly,
    ];

    /// Coarse recency code understood by the search service.
    pub fn recency_code(self) -> &'static str {
        match self {
            Timeframe::Daily => "d",
            Timeframe::Weekly => "w",
            Timeframe::Monthly => "m",
            Timeframe::Yearly => "y",
        }
    }

    /// Maximum article age in days.
    pub fn max_age_days(self) -> u32 {
        match self {
            Timeframe::Daily => 1,
            Timeframe::Weekly => 7,
            Timeframe::Monthly => 30,
            Timeframe::Yearly => 365,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Daily => "Daily",
            Timeframe::Weekly => "Weekly",
            Timeframe::Monthly => "Monthly",
            Timeframe::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s.trim())
            .ok_or_else(|| DigestError::UnknownTimeframe(s.to_string()))
    }
}

/// A raw news article as returned by the search service.
///
/// Fields the service omits or sends as `null` deserialize as empty text. The
/// date is whatever the service reports and is not validated locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub published_date: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where a run currently is in the fetch → summarize sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Idle,
    Fetched,
    Summarized,
}

/// The contribution of one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateDelta {
    Fetched { raw_articles: Vec<ArticleRecord> },
    Summarized { summary: String },
}

/// The state of one digest run.
///
/// Steps never mutate a shared state; each returns a [`StateDelta`] which is
/// merged into a new value with [`PipelineState::merge`]. The merge enforces
/// that articles are set exactly once and before the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineState {
    pub timeframe: Timeframe,
    pub raw_articles: Vec<ArticleRecord>,
    pub summary: String,
    pub stage: Stage,
}

impl PipelineState {
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            raw_articles: Vec::new(),
            summary: String::new(),
            stage: Stage::Idle,
        }
    }

    pub fn merge(self, delta: StateDelta) -> Result<Self, DigestError> {
        match (self.stage, delta) {
            (Stage::Idle, StateDelta::Fetched { raw_articles }) => Ok(Self {
                raw_articles,
                stage: Stage::Fetched,
                ..self
            }),
            (Stage::Fetched, StateDelta::Summarized { summary }) => Ok(Self {
                summary,
                stage: Stage::Summarized,
                ..self
            }),
            (_, StateDelta::Fetched { .. }) => {
                Err(DigestError::OutOfOrder("articles were already fetched"))
            }
            (Stage::Idle, StateDelta::Summarized { .. }) => {
                Err(DigestError::OutOfOrder("summary requested before fetch"))
            }
            (Stage::Summarized, StateDelta::Summarized { .. }) => {
                Err(DigestError::OutOfOrder("summary was already produced"))
            }
        }
    }
}
