//! Error taxonomy for a digest run.
//!
//! Every variant is fatal to the run that produced it. Nothing is retried;
//! the web layer maps each variant to a status code and shows the message.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    /// Missing or malformed credentials / provider settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The timeframe string does not name a known recency window.
    #[error("unknown timeframe `{0}` (expected Daily, Weekly, Monthly or Yearly)")]
    UnknownTimeframe(String),

    /// The news search service failed (transport, status or decoding).
    #[error("search service error: {0}")]
    Search(String),

    /// The language model service failed (transport, status or decoding).
    #[error("model service error: {0}")]
    Model(String),

    /// A pipeline step was merged into the state out of order.
    #[error("pipeline step out of order: {0}")]
    OutOfOrder(&'static str),
}

impl DigestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DigestError::Configuration(_) | DigestError::UnknownTimeframe(_) => {
                StatusCode::BAD_REQUEST
            }
            DigestError::Search(_) | DigestError::Model(_) => StatusCode::BAD_GATEWAY,
            DigestError::OutOfOrder(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures reported by one of the upstream services.
    pub fn is_upstream(&self) -> bool {
        matches!(self, DigestError::Search(_) | DigestError::Model(_))
    }
}
