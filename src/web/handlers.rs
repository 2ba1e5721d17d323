//! Route handlers and the request-scoped digest run.
//!
//! All three run routes go through [`run_digest`]. The form route renders
//! failures back into the form; the JSON routes return them as
//! `{"error": ...}` with the status from [`DigestError::status_code`].

use super::{AppState, Credentials, DigestRequest, pages};
use crate::api::{AzureChat, GroqChat, ModelProvider, ProviderKind, azure::AzureSettings};
use crate::config::Config;
use crate::error::DigestError;
use crate::models::{PipelineState, Timeframe};
use crate::outputs::download::DigestArtifact;
use crate::pipeline::DigestPipeline;
use crate::search::TavilyClient;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// JSON body of `POST /api/digest`.
#[derive(Debug, Serialize)]
pub struct DigestResponse {
    pub timeframe: Timeframe,
    pub filename: String,
    pub content_type: &'static str,
    pub article_count: usize,
    pub summary: String,
}

/// Build the model collaborator for the configured provider.
fn build_model(config: &Config, creds: &Credentials) -> Result<ModelProvider, DigestError> {
    match config.model.provider {
        ProviderKind::Groq => {
            let model = if creds.groq_model.trim().is_empty() {
                config.model.groq.default_model().unwrap_or_default()
            } else {
                creds.groq_model.trim()
            };
            if !config.model.groq.models.is_empty()
                && !config.model.groq.models.iter().any(|m| m == model)
            {
                return Err(DigestError::Configuration(format!(
                    "Groq model `{model}` is not one of the offered models"
                )));
            }
            let chat = GroqChat::new(&creds.groq_api_key, model, &config.model.groq.base_url)?;
            Ok(ModelProvider::Groq(chat))
        }
        ProviderKind::Azure => {
            let chat = AzureChat::new(AzureSettings {
                api_key: &creds.azure_api_key,
                endpoint: &creds.azure_endpoint,
                api_version: &creds.azure_api_version,
                deployment: &creds.azure_deployment,
            })?;
            Ok(ModelProvider::Azure(chat))
        }
    }
}

/// Run one digest for a request: parse the timeframe, build the clients from
/// the submitted credentials, run the pipeline and package the artifact.
#[instrument(level = "info", skip_all, fields(timeframe = %request.timeframe))]
pub async fn run_digest(
    state: &AppState,
    request: DigestRequest,
) -> Result<(PipelineState, DigestArtifact), DigestError> {
    let timeframe: Timeframe = request.timeframe.parse()?;
    let generated_at = Local::now();
    let creds = request.credentials.or(&state.defaults);
    let config = &state.config;

    let search = TavilyClient::new(&creds.tavily_api_key, &config.search.endpoint)?;
    let model = build_model(config, &creds)?;
    info!(provider = %model.kind(), %timeframe, "Starting digest run");

    let pipeline = DigestPipeline::new(
        search,
        model,
        config.search.clone(),
        config.digest.timezone.clone(),
    );
    let done = pipeline.run(timeframe).await?;
    let artifact = DigestArtifact::new(timeframe, generated_at, done.summary.clone());
    Ok((done, artifact))
}

pub(super) async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::form_page(&state.config, &pages::FormValues::default(), None))
}

pub(super) async fn digest_form(
    State(state): State<Arc<AppState>>,
    Form(request): Form<DigestRequest>,
) -> Response {
    let values = pages::FormValues {
        timeframe: request.timeframe.parse::<Timeframe>().ok(),
        groq_model: request.credentials.groq_model.trim().to_string(),
    };
    match run_digest(&state, request).await {
        Ok((done, artifact)) => Html(pages::result_page(&state.config, &done, &artifact)).into_response(),
        Err(e) => {
            if e.is_upstream() {
                error!(error = %e, "Upstream service failed; re-rendering form");
            } else {
                warn!(error = %e, "Digest request rejected; re-rendering form");
            }
            let status = e.status_code();
            (status, Html(pages::form_page(&state.config, &values, Some(&e)))).into_response()
        }
    }
}

pub(super) async fn api_digest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DigestRequest>,
) -> Result<Json<DigestResponse>, DigestError> {
    let (done, artifact) = run_digest(&state, request).await?;
    Ok(Json(DigestResponse {
        timeframe: done.timeframe,
        filename: artifact.filename(),
        content_type: artifact.content_type(),
        article_count: done.raw_articles.len(),
        summary: artifact.body,
    }))
}

pub(super) async fn api_download(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DigestRequest>,
) -> Result<DigestArtifact, DigestError> {
    let (_, artifact) = run_digest(&state, request).await?;
    Ok(artifact)
}

pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::create_router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use mockito::{Matcher, Mock, ServerGuard};
    use serde_json::{Value, json};
    use tower::ServiceExt; // provides .oneshot()

    /// Mock Tavily + Groq on one server and point the config at it.
    async fn upstream(results: Value, digest: &str) -> (ServerGuard, Vec<Mock>, AppState) {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("POST", "/search")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "results": results }).to_string())
            .create_async()
            .await;
        let chat = server
            .mock("POST", "/openai/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "choices": [{ "message": { "content": digest } }] }).to_string())
            .create_async()
            .await;

        let mut config = Config::default();
        config.search.endpoint = format!("{}/search", server.url());
        config.model.groq.base_url = format!("{}/openai/v1", server.url());
        let state = AppState {
            config,
            defaults: Credentials {
                tavily_api_key: "tvly-env".into(),
                groq_api_key: "gsk-env".into(),
                ..Credentials::default()
            },
        };
        (server, vec![search, chat], state)
    }

    fn form_post(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_post(path: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let app = create_router(AppState::default());
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains(r#"action="/digest""#));
        assert!(html.contains(r#"value="Weekly" checked"#));
        assert!(html.contains("openai/gpt-oss-20b"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(AppState::default());
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(v["status"], "ok");
    }

    #[tokio::test]
    async fn test_form_run_renders_digest_and_download() {
        let digest = "### 2025-01-10\n- [Chip launch](https://news.example/1)\n";
        let (_server, _mocks, state) = upstream(
            json!([{ "url": "https://news.example/1", "content": "chip", "published_date": "2025-01-10" }]),
            digest,
        )
        .await;
        let app = create_router(state);

        let resp = app.oneshot(form_post("/digest", "timeframe=Weekly")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("<h3>2025-01-10</h3>"));
        assert!(html.contains(r#"download="AI_News_Weekly_"#));

        // The download link carries exactly the rendered digest.
        let prefix = "data:text/markdown;charset=utf-8;base64,";
        let start = html.find(prefix).unwrap() + prefix.len();
        let end = start + html[start..].find('"').unwrap();
        let decoded = STANDARD.decode(&html[start..end]).unwrap();
        assert_eq!(decoded, digest.as_bytes());
    }

    #[tokio::test]
    async fn test_daily_empty_results_still_downloads() {
        let (_server, _mocks, state) = upstream(json!([]), "No AI news found for today.").await;
        let app = create_router(state);

        let before = Local::now().format("%d%m%Y").to_string();
        let resp = app
            .oneshot(json_post("/api/digest/download", json!({ "timeframe": "Daily" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/markdown");
        let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.contains("AI_News_Daily_"));
        assert!(disposition.ends_with(".md\""));
        let after = Local::now().format("%d%m%Y").to_string();
        assert!(disposition.contains(&before) || disposition.contains(&after));
        assert_eq!(body_text(resp).await, "No AI news found for today.");
    }

    #[tokio::test]
    async fn test_api_digest_json() {
        let (_server, _mocks, state) = upstream(
            json!([
                { "url": "https://a.example", "content": "a", "published_date": "2025-01-10" },
                { "url": "https://b.example", "content": "b" }
            ]),
            "### 2025-01-10",
        )
        .await;
        let app = create_router(state);

        let resp = app
            .oneshot(json_post("/api/digest", json!({ "timeframe": "Monthly" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(v["timeframe"], "Monthly");
        assert_eq!(v["article_count"], 2);
        assert_eq!(v["content_type"], "text/markdown");
        assert_eq!(v["summary"], "### 2025-01-10");
        assert!(v["filename"].as_str().unwrap().starts_with("AI_News_Monthly_"));
    }

    #[tokio::test]
    async fn test_unknown_timeframe_is_bad_request_without_upstream_calls() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let mut config = Config::default();
        config.search.endpoint = format!("{}/search", server.url());
        let app = create_router(AppState {
            config,
            ..AppState::default()
        });

        let resp = app
            .oneshot(json_post("/api/digest", json!({ "timeframe": "Hourly" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert!(v["error"].as_str().unwrap().contains("Hourly"));
        search.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_credentials_rerenders_form() {
        let app = create_router(AppState::default());
        let resp = app.oneshot(form_post("/digest", "timeframe=Monthly")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let html = body_text(resp).await;
        assert!(html.contains("Tavily API key is required"));
        assert!(html.contains(r#"value="Monthly" checked"#));
    }

    #[tokio::test]
    async fn test_failed_run_keeps_selected_groq_model() {
        let app = create_router(AppState::default());
        let resp = app
            .oneshot(form_post(
                "/digest",
                "timeframe=Daily&groq_model=openai%2Fgpt-oss-120b",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let html = body_text(resp).await;
        assert!(html.contains(r#"<option value="openai/gpt-oss-120b" selected>"#));
        assert!(html.contains(r#"value="Daily" checked"#));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("POST", "/search")
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;
        let mut config = Config::default();
        config.search.endpoint = format!("{}/search", server.url());
        let app = create_router(AppState {
            config,
            defaults: Credentials {
                tavily_api_key: "bad".into(),
                groq_api_key: "gsk".into(),
                ..Credentials::default()
            },
        });

        let resp = app
            .oneshot(json_post("/api/digest", json!({ "timeframe": "Weekly" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_build_model_rejects_unoffered_groq_model() {
        let creds = Credentials {
            groq_api_key: "gsk".into(),
            groq_model: "llama-3.1-8b-instant".into(),
            ..Credentials::default()
        };
        let err = build_model(&Config::default(), &creds).unwrap_err();
        assert!(matches!(err, DigestError::Configuration(_)));
    }

    #[test]
    fn test_build_model_selects_azure_by_config() {
        let mut config = Config::default();
        config.model.provider = ProviderKind::Azure;
        let creds = Credentials {
            azure_api_key: "k".into(),
            azure_endpoint: "https://res.openai.azure.com".into(),
            azure_api_version: "2024-06-01".into(),
            azure_deployment: "gpt-4o".into(),
            ..Credentials::default()
        };
        let model = build_model(&config, &creds).unwrap();
        assert_eq!(model.kind(), ProviderKind::Azure);
    }
}
