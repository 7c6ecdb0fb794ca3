use std::sync::Arc;

use crate::config::Config;
use crate::generation::fit_scoring::FitScorer;
use crate::llm_client::ModelCapability;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Text-in / text-out model. `LlmClient` in production.
    pub model: Arc<dyn ModelCapability>,
    /// Pluggable fit scorer. Default: LlmFitScorer over the same model.
    pub fit_scorer: Arc<dyn FitScorer>,
    pub rate_limiter: RateLimiter,
    pub config: Config,
}
