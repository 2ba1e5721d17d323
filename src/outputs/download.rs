//! Downloadable markdown artifact.
//!
//! The file is named after the timeframe and the local time of the run:
//!
//! ```text
//! AI_News_Weekly_18102026_142501.md
//! ```
//!
//! and its body is the digest text, byte for byte.

use crate::models::Timeframe;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local};

pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestArtifact {
    pub timeframe: Timeframe,
    pub generated_at: DateTime<Local>,
    pub body: String,
}

impl DigestArtifact {
    pub fn new(timeframe: Timeframe, generated_at: DateTime<Local>, body: String) -> Self {
        Self {
            timeframe,
            generated_at,
            body,
        }
    }

    pub fn filename(&self) -> String {
        format!(
            "AI_News_{}_{}.md",
            self.timeframe,
            self.generated_at.format("%d%m%Y_%H%M%S")
        )
    }

    pub fn content_type(&self) -> &'static str {
        MARKDOWN_CONTENT_TYPE
    }

    /// `data:` URL carrying the exact body bytes, for a browser download link.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};charset=utf-8;base64,{}",
            MARKDOWN_CONTENT_TYPE,
            STANDARD.encode(self.body.as_bytes())
        )
    }
}

impl IntoResponse for DigestArtifact {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename());
        (
            [
                (header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}
