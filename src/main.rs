//! # AI News Digest
//!
//! A small web app that fetches recent AI news through the Tavily search API
//! and asks a language model to compress it into a dated markdown digest.
//!
//! ## Features
//!
//! - Daily / Weekly / Monthly (optionally Yearly) recency windows
//! - Groq or Azure OpenAI as the model provider, picked by configuration
//! - Rendered result view plus a `.md` download of the exact digest text
//! - JSON API for scripted use
//!
//! ## Usage
//!
//! ```sh
//! ai_news_digest --bind 127.0.0.1:8501
//! ai_news_digest -c digest.yaml --provider azure
//! ```
//!
//! ## Architecture
//!
//! Each run is a strict two-step pipeline:
//! 1. **Fetch**: One search request for the chosen timeframe
//! 2. **Summarize**: One model call over the serialized articles
//!
//! The model's reply is returned verbatim, rendered, and offered for download.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod search;
mod summarizer;
mod utils;
mod web;

use cli::Cli;
use config::Config;
use web::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "ai_news_digest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(config = ?args.config, bind = ?args.bind, provider = ?args.provider, "Parsed CLI arguments");

    // ---- Load config & apply overrides ----
    let mut config = Config::load(args.config.as_deref()).await?;
    args.apply(&mut config);
    let defaults = args.default_credentials(&config);
    info!(
        provider = %config.model.provider,
        timezone = %config.digest.timezone,
        search_endpoint = %config.search.endpoint,
        has_tavily_key = !defaults.tavily_api_key.is_empty(),
        "Configuration ready"
    );

    web::serve(AppState { config, defaults }).await
}
