mod config;
mod errors;
mod generation;
mod grounding;
mod intake;
mod llm_client;
mod rate_limit;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::fit_scoring::LlmFitScorer;
use crate::llm_client::{LlmClient, ModelCapability};
use crate::rate_limit::{InMemoryRateLimitStore, RateLimiter};
use crate::routes::build_router;
use crate::state::AppState;

/// How often elapsed rate-limit windows are dropped from memory.
const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let model: Arc<dyn ModelCapability> =
        Arc::new(LlmClient::new(config.anthropic_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Fit scorer shares the model client
    let fit_scorer = Arc::new(LlmFitScorer::new(model.clone()));

    // Rate limiter (in-memory windows, swept periodically)
    let rate_limiter = RateLimiter::new(
        Arc::new(InMemoryRateLimitStore::new()),
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    info!(
        "Rate limit: {} requests per {}s",
        config.rate_limit_max_requests, config.rate_limit_window_secs
    );
    spawn_rate_limit_sweeper(rate_limiter.clone());

    // Build app state
    let state = AppState {
        model,
        fit_scorer,
        rate_limiter,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict allowed origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn spawn_rate_limit_sweeper(limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = limiter.sweep().await;
            if removed > 0 {
                debug!("Swept {removed} expired rate-limit windows");
            }
        }
    });
}
