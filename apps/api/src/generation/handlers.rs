//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::generator::{generate_resume, GenerateRequest, GenerateResponse};
use crate::generation::themes::{extract_themes, ThemeSet};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThemesRequest {
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct ThemesResponse {
    pub themes: ThemeSet,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/generate
///
/// Full pipeline: themes → model generate → recover → ground → fit score.
/// Rate limited per client (see `rate_limit`).
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = payload?;
    validate_generate_request(&request)?;

    let response =
        generate_resume(state.model.as_ref(), state.fit_scorer.as_ref(), &request).await?;

    Ok(Json(response))
}

/// POST /api/v1/jobs/themes
///
/// Previews the themes a job description would steer generation towards.
/// Deterministic; no model call.
pub async fn handle_extract_themes(
    payload: Result<Json<ThemesRequest>, JsonRejection>,
) -> Result<Json<ThemesResponse>, AppError> {
    let Json(request) = payload?;
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    Ok(Json(ThemesResponse {
        themes: extract_themes(&request.job_description),
    }))
}

fn validate_generate_request(request: &GenerateRequest) -> Result<(), AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    if request.candidate_resume.trim().is_empty() {
        return Err(AppError::Validation(
            "candidate_resume cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(job_description: &str, candidate_resume: &str) -> GenerateRequest {
        GenerateRequest {
            job_description: job_description.to_string(),
            candidate_resume: candidate_resume.to_string(),
            company_vision: None,
        }
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        assert!(matches!(
            validate_generate_request(&request("  ", "résumé")),
            Err(AppError::Validation(msg)) if msg.starts_with("job_description")
        ));
        assert!(matches!(
            validate_generate_request(&request("Backend role", "\n\t")),
            Err(AppError::Validation(msg)) if msg.starts_with("candidate_resume")
        ));
        assert!(validate_generate_request(&request("Backend role", "résumé")).is_ok());
    }

    #[test]
    fn test_missing_fields_are_validation_errors() {
        let partial: GenerateRequest =
            serde_json::from_str(r#"{"job_description": "Backend role"}"#).unwrap();
        assert!(matches!(
            validate_generate_request(&partial),
            Err(AppError::Validation(msg)) if msg == "candidate_resume cannot be empty"
        ));

        let themes: ThemesRequest = serde_json::from_str("{}").unwrap();
        assert!(themes.job_description.is_empty());
    }

    #[tokio::test]
    async fn test_themes_handler() {
        let Json(response) = handle_extract_themes(Ok(Json(ThemesRequest {
            job_description: "Data platform team using Kafka".to_string(),
        })))
        .await
        .unwrap();
        assert_eq!(
            response.themes.as_slice(),
            &["data", "infrastructure", "kafka"]
        );

        let empty = handle_extract_themes(Ok(Json(ThemesRequest::default()))).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));
    }
}
