//! Fit Scoring — pluggable, trait-based scorer that rates a tailored résumé against a job.
//!
//! Default: `LlmFitScorer`, which asks the model for a 0–100 score plus a per-dimension
//! breakdown. Scoring never fails a request: any model or parse problem falls back to
//! a fixed estimate, labelled via `scorer_backend`.
//!
//! `AppState` holds an `Arc<dyn FitScorer>`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::generation::prompts::{fill_template, FIT_SCORE_PROMPT_TEMPLATE, FIT_SCORE_SYSTEM};
use crate::generation::recovery::{recover, ParseFailure, RecoveredObject, RequiredKey};
use crate::generation::themes::ThemeSet;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{CallOptions, LlmError, ModelCapability};

const FIT_SCORE_OPTIONS: CallOptions = CallOptions {
    max_tokens: 1000,
    temperature: 0.2,
};

const FIT_SCORE_KEYS: &[RequiredKey] = &[
    RequiredKey::number("overall_score"),
    RequiredKey::object("breakdown"),
    RequiredKey::text("explanation"),
];

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Per-dimension scores, each 0 – 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitBreakdown {
    pub keyword_match: u32,
    pub theme_alignment: u32,
    pub experience_relevance: u32,
    pub skill_overlap: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitScore {
    pub score: u32, // 0 – 100
    pub breakdown: FitBreakdown,
    pub explanation: String,
    pub scorer_backend: String, // "llm" | "estimate"
}

impl FitScore {
    /// Shown when the model could not produce a usable score.
    pub fn estimated() -> Self {
        Self {
            score: 75,
            breakdown: FitBreakdown {
                keyword_match: 80,
                theme_alignment: 75,
                experience_relevance: 70,
                skill_overlap: 75,
            },
            explanation: "Unable to calculate precise fit score, showing estimated values"
                .to_string(),
            scorer_backend: "estimate".to_string(),
        }
    }
}

/// Everything a scorer may look at.
#[derive(Debug, Clone, Copy)]
pub struct FitInputs<'a> {
    pub job_description: &'a str,
    pub candidate_resume: &'a str,
    pub generated_resume: &'a str,
    pub keywords: &'a [String],
    pub themes: &'a ThemeSet,
}

#[derive(Debug, Error)]
enum FitScoreError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error("'{0}' is not a number")]
    InvalidScore(&'static str),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The fit scorer trait. Implement this to swap backends without touching
/// the handler or the generation pipeline. Infallible by contract.
#[async_trait]
pub trait FitScorer: Send + Sync {
    async fn score(&self, inputs: &FitInputs<'_>) -> FitScore;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmFitScorer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmFitScorer {
    model: Arc<dyn ModelCapability>,
}

impl LlmFitScorer {
    pub fn new(model: Arc<dyn ModelCapability>) -> Self {
        Self { model }
    }

    async fn try_score(&self, inputs: &FitInputs<'_>) -> Result<FitScore, FitScoreError> {
        let keywords = inputs.keywords.join(", ");
        let themes = inputs.themes.join(", ");
        let prompt = fill_template(
            FIT_SCORE_PROMPT_TEMPLATE,
            &[
                ("job_description", inputs.job_description),
                ("candidate_resume", inputs.candidate_resume),
                ("generated_resume", inputs.generated_resume),
                ("keywords", keywords.as_str()),
                ("themes", themes.as_str()),
            ],
        );
        let system = format!("{FIT_SCORE_SYSTEM} {JSON_ONLY_SYSTEM}");

        let raw = self
            .model
            .complete(&prompt, &system, FIT_SCORE_OPTIONS)
            .await?;
        let object = recover(&raw, FIT_SCORE_KEYS)?;
        parse_fit_score(&object)
    }
}

#[async_trait]
impl FitScorer for LlmFitScorer {
    async fn score(&self, inputs: &FitInputs<'_>) -> FitScore {
        match self.try_score(inputs).await {
            Ok(fit) => {
                info!("Fit score: {}/100", fit.score);
                fit
            }
            Err(e) => {
                warn!("Fit scoring failed, falling back to estimate: {e}");
                FitScore::estimated()
            }
        }
    }
}

fn parse_fit_score(object: &RecoveredObject) -> Result<FitScore, FitScoreError> {
    let breakdown = object.get("breakdown");
    let dimension = |key: &'static str| {
        percentage(breakdown.and_then(|b| b.get(key))).ok_or(FitScoreError::InvalidScore(key))
    };

    Ok(FitScore {
        score: percentage(object.get("overall_score"))
            .ok_or(FitScoreError::InvalidScore("overall_score"))?,
        breakdown: FitBreakdown {
            keyword_match: dimension("keywordMatch")?,
            theme_alignment: dimension("themeAlignment")?,
            experience_relevance: dimension("experienceRelevance")?,
            skill_overlap: dimension("skillOverlap")?,
        },
        explanation: object
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        scorer_backend: "llm".to_string(),
    })
}

/// Reads a JSON number as a whole percentage, clamped to 0 – 100.
fn percentage(value: Option<&Value>) -> Option<u32> {
    value?
        .as_f64()
        .map(|v| v.clamp(0.0, 100.0).round() as u32)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
