//! Résumé Generation — orchestrates the full tailoring pipeline.
//!
//! Flow: extract_themes → build prompt → model → recover → ground (patch + diff)
//!       → fit score → response.
//!
//! The pipeline never persists anything; the candidate's résumé lives only for
//! the duration of the request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::generation::fit_scoring::{FitInputs, FitScore, FitScorer};
use crate::generation::prompts::{
    fill_template, COMPANY_VISION_SECTION_TEMPLATE, GENERATION_PROMPT_TEMPLATE,
    GENERATION_SYSTEM,
};
use crate::generation::recovery::{recover, RecoveredObject, RequiredKey};
use crate::generation::themes::{extract_themes, ThemeSet};
use crate::grounding::{review_generated, GroundingReview};
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{CallOptions, ModelCapability};

const GENERATION_OPTIONS: CallOptions = CallOptions {
    max_tokens: 4000,
    temperature: 0.3,
};

const GENERATION_KEYS: &[RequiredKey] = &[
    RequiredKey::text("resume_md"),
    RequiredKey::text("fit_summary"),
    RequiredKey::list("keywords"),
];

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for résumé generation. Missing fields deserialize as empty so the
/// handler reports them as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    pub job_description: String,
    pub candidate_resume: String,
    pub company_vision: Option<String>,
}

/// Response from the generation pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    /// Possibly auto-patched.
    pub resume_md: String,
    pub fit_summary: String,
    pub keywords: Vec<String>,
    pub themes: ThemeSet,
    pub auto_patched: bool,
    /// Advisory only. Omitted when grounding found nothing to flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanity_concerns: Option<Vec<String>>,
    pub fit_score: FitScore,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full tailoring pipeline for one request.
///
/// A model or parse failure aborts the request; grounding concerns and fit-score
/// problems never do.
pub async fn generate_resume(
    model: &dyn ModelCapability,
    fit_scorer: &dyn FitScorer,
    request: &GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    // Step 1: Themes
    let themes = extract_themes(&request.job_description);
    info!(
        "Generating résumé: jd_chars={}, resume_chars={}, themes={}",
        request.job_description.chars().count(),
        request.candidate_resume.chars().count(),
        themes.as_slice().len()
    );

    // Step 2: Model call
    let prompt = build_generation_prompt(request, &themes);
    let raw = model
        .complete(&prompt, GENERATION_SYSTEM, GENERATION_OPTIONS)
        .await?;

    // Step 3: Recover the structured reply
    let object = recover(&raw, GENERATION_KEYS)?;
    let resume_md = text_field(&object, "resume_md");
    let fit_summary = text_field(&object, "fit_summary");
    let keywords = keyword_list(&object);

    // Step 4: Grounding
    let GroundingReview {
        text: resume_md,
        auto_patched,
        concerns,
    } = review_generated(&resume_md, &request.candidate_resume);
    info!(
        "Grounding: auto_patched={}, concerns={}",
        auto_patched,
        concerns.len()
    );
    let sanity_concerns = if concerns.is_empty() {
        None
    } else {
        Some(concerns.iter().map(ToString::to_string).collect())
    };

    // Step 5: Fit score
    let fit_score = fit_scorer
        .score(&FitInputs {
            job_description: &request.job_description,
            candidate_resume: &request.candidate_resume,
            generated_resume: &resume_md,
            keywords: &keywords,
            themes: &themes,
        })
        .await;

    Ok(GenerateResponse {
        resume_md,
        fit_summary,
        keywords,
        themes,
        auto_patched,
        sanity_concerns,
        fit_score,
    })
}

fn build_generation_prompt(request: &GenerateRequest, themes: &ThemeSet) -> String {
    let company_vision_section = match request.company_vision.as_deref().map(str::trim) {
        Some(vision) if !vision.is_empty() => {
            fill_template(COMPANY_VISION_SECTION_TEMPLATE, &[("company_vision", vision)])
        }
        _ => String::new(),
    };
    let themes = if themes.is_empty() {
        "the job's core requirements".to_string()
    } else {
        themes.join(", ")
    };

    fill_template(
        GENERATION_PROMPT_TEMPLATE,
        &[
            ("themes", themes.as_str()),
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("job_description", request.job_description.as_str()),
            ("candidate_resume", request.candidate_resume.as_str()),
            ("company_vision_section", company_vision_section.as_str()),
        ],
    )
}

fn text_field(object: &RecoveredObject, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// String entries of `keywords`; anything else the model put in the list is dropped.
fn keyword_list(object: &RecoveredObject) -> Vec<String> {
    object
        .get("keywords")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
