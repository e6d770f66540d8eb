mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::AnalysisEngine;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pipeline::jd_resolver::{HttpPageFetcher, JdResolver};
use crate::pipeline::Pipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JD Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    let fetcher = HttpPageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
    info!("Page fetcher initialized (timeout: {}s)", config.fetch_timeout_secs);

    let llm = LlmClient::new(&config.gemini_base_url, &config.gemini_model)?;
    info!("LLM client initialized (model: {})", config.gemini_model);
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; analysis requests will fail until it is configured");
    }

    let pipeline = Pipeline::new(
        JdResolver::new(Arc::new(fetcher)),
        AnalysisEngine::new(Arc::new(llm), config.gemini_api_key.clone()),
    );

    let app = build_router(AppState { pipeline }, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
