pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::intake::handlers::{self as intake, MAX_PDF_BYTES};
use crate::rate_limit::enforce_rate_limit;
use crate::state::AppState;

/// Headroom over the file limit for multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let rate_limit = middleware::from_fn_with_state(state.rate_limiter.clone(), enforce_rate_limit);

    Router::new()
        .route("/health", get(health::health_handler))
        // Résumé API
        .route(
            "/api/v1/resumes/generate",
            post(generation::handle_generate).layer(rate_limit),
        )
        .route(
            "/api/v1/resumes/parse",
            post(intake::handle_parse_resume)
                .layer(DefaultBodyLimit::max(MAX_PDF_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        // Jobs API
        .route("/api/v1/jobs/themes", post(generation::handle_extract_themes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::generation::fit_scoring::LlmFitScorer;
    use crate::llm_client::scripted::ScriptedModel;
    use crate::llm_client::ModelCapability;
    use crate::rate_limit::{InMemoryRateLimitStore, RateLimiter};

    fn test_state(max_requests: u32) -> AppState {
        let model: Arc<dyn ModelCapability> = Arc::new(ScriptedModel::default());
        AppState {
            fit_scorer: Arc::new(LlmFitScorer::new(model.clone())),
            model,
            rate_limiter: RateLimiter::new(
                Arc::new(InMemoryRateLimitStore::new()),
                max_requests,
                Duration::from_secs(3600),
            ),
            config: Config {
                anthropic_api_key: "test-key".to_string(),
                port: 8080,
                rust_log: "info".to_string(),
                rate_limit_max_requests: max_requests,
                rate_limit_window_secs: 3600,
                max_resume_chars: 10_000,
            },
        }
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_is_json_validation_error() {
        let response = build_router(test_state(10))
            .oneshot(post_json(
                "/api/v1/resumes/generate",
                r#"{"job_description": "Backend role"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "candidate_resume cannot be empty");
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_validation_error() {
        let router = build_router(test_state(10));

        let response = router
            .clone()
            .oneshot(post_json("/api/v1/resumes/generate", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");

        let response = router
            .oneshot(post_json("/api/v1/jobs/themes", r#"{"job_description": 7}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_is_rate_limited_per_client() {
        let router = build_router(test_state(1));
        let request = || {
            let mut request = post_json("/api/v1/resumes/generate", "{}");
            request
                .headers_mut()
                .insert("x-forwarded-for", "203.0.113.9".parse().unwrap());
            request
        };

        let first = router.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::BAD_REQUEST);

        let second = router.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(json_body(second).await["error"]["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_themes_route_is_not_rate_limited() {
        let router = build_router(test_state(1));
        for _ in 0..3 {
            let response = router
                .clone()
                .oneshot(post_json(
                    "/api/v1/jobs/themes",
                    r#"{"job_description": "Data platform team using Kafka"}"#,
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                json_body(response).await["themes"],
                serde_json::json!(["data", "infrastructure", "kafka"])
            );
        }
    }
}
