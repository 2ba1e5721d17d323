//! HTTP surface of the digest server.
//!
//! | Method | Path                   | Purpose                                    |
//! |--------|------------------------|--------------------------------------------|
//! | GET    | `/`                    | Timeframe + credentials form               |
//! | POST   | `/digest`              | Run from the form, render result + download |
//! | POST   | `/api/digest`          | Run from JSON, return the digest as JSON   |
//! | POST   | `/api/digest/download` | Run from JSON, return the `.md` attachment |
//! | GET    | `/health`              | Liveness                                   |
//!
//! Every run is request-scoped: the handler builds its own clients from the
//! submitted credentials and owns its pipeline state.

mod handlers;
mod pages;

use crate::config::Config;
use crate::error::DigestError;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::error::Error;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

/// Shared, read-only server state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub config: Config,
    /// Credentials used when a form field is left blank.
    pub defaults: Credentials,
}

/// Credential and provider fields as submitted by a client.
///
/// Blank fields fall back to [`AppState::defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub tavily_api_key: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub azure_api_key: String,
    pub azure_endpoint: String,
    pub azure_api_version: String,
    pub azure_deployment: String,
}

impl Credentials {
    /// Fill blank fields from `defaults`.
    pub fn or(self, defaults: &Credentials) -> Credentials {
        fn pick(value: String, fallback: &str) -> String {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value
            }
        }
        Credentials {
            tavily_api_key: pick(self.tavily_api_key, &defaults.tavily_api_key),
            groq_api_key: pick(self.groq_api_key, &defaults.groq_api_key),
            groq_model: pick(self.groq_model, &defaults.groq_model),
            azure_api_key: pick(self.azure_api_key, &defaults.azure_api_key),
            azure_endpoint: pick(self.azure_endpoint, &defaults.azure_endpoint),
            azure_api_version: pick(self.azure_api_version, &defaults.azure_api_version),
            azure_deployment: pick(self.azure_deployment, &defaults.azure_deployment),
        }
    }
}

/// One run request, from the HTML form or the JSON API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DigestRequest {
    #[serde(default)]
    pub timeframe: String,
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl IntoResponse for DigestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/digest", post(handlers::digest_form))
        .route("/api/digest", post(handlers::api_digest))
        .route("/api/digest/download", post(handlers::api_download))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind the configured address and serve until the process exits.
#[instrument(level = "info", skip_all, fields(bind = %state.config.server.bind))]
pub async fn serve(state: AppState) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(&state.config.server.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        provider = %state.config.model.provider,
        "Digest server listening"
    );
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
