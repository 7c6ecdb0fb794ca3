// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for résumé generation.
pub const GENERATION_SYSTEM: &str = "\
You are a world-class résumé writer for technical and product talent. \
You tailor an existing résumé to a job description without adding facts. \
Respond with valid JSON only. Do NOT add any text outside the JSON object.";

/// Résumé generation prompt. Replace `{job_description}`, `{candidate_resume}`,
/// `{company_vision_section}`, `{themes}` and `{grounding_instruction}` before sending.
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"Tailor the candidate's résumé to the job below.

Return a JSON object with this EXACT schema:
{
  "resume_md": "markdown résumé text",
  "fit_summary": "3-line explanation of why the candidate fits the role",
  "keywords": ["keyword1", "keyword2", "keyword3"]
}

RULES:
- One printed page (about 500-700 words), clean Markdown, no tables, columns or images.
- Start with the candidate's name, title and contact placeholders.
- Use strong action verbs and emphasise these themes where the résumé supports them: {themes}
- {grounding_instruction}

JOB DESCRIPTION:
{job_description}

CANDIDATE RÉSUMÉ:
{candidate_resume}
{company_vision_section}"#;

/// Optional section appended when the caller supplies company vision text.
pub const COMPANY_VISION_SECTION_TEMPLATE: &str = "\nCOMPANY VISION / CULTURE:\n{company_vision}\n";

/// System prompt for fit scoring. Sent together with `JSON_ONLY_SYSTEM`.
pub const FIT_SCORE_SYSTEM: &str = "\
You are an expert recruiter evaluating how well a candidate's résumé matches a job description.";

/// Fit scoring prompt. Replace `{job_description}`, `{candidate_resume}`,
/// `{generated_resume}`, `{keywords}` and `{themes}` before sending.
pub const FIT_SCORE_PROMPT_TEMPLATE: &str = r#"Evaluate the candidate against the job.

JOB DESCRIPTION:
{job_description}

ORIGINAL CANDIDATE RÉSUMÉ:
{candidate_resume}

TAILORED RÉSUMÉ:
{generated_resume}

KEYWORDS USED: {keywords}
THEMES COVERED: {themes}

Score each dimension from 0 to 100:
1. keywordMatch: key terms and requirements from the job present in the tailored résumé
2. themeAlignment: alignment with the job's main themes and priorities
3. experienceRelevance: relevance of experience, seniority, industry and role type
4. skillOverlap: overlap of technical and soft skills

Return JSON only:
{
  "overall_score": 85,
  "breakdown": {
    "keywordMatch": 90,
    "themeAlignment": 85,
    "experienceRelevance": 80,
    "skillOverlap": 85
  },
  "explanation": "One or two sentences."
}"#;

/// Fills `{name}` placeholders in one left-to-right pass. Substituted text is never
/// rescanned, so user input that looks like a placeholder stays literal. Braces that
/// do not open a known placeholder are copied through.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = values.iter().find_map(|(name, value)| {
            after
                .strip_prefix(name)
                .and_then(|tail| tail.strip_prefix('}'))
                .map(|tail| (*value, tail))
        });
        match placeholder {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_leaves_json_braces() {
        let filled = fill_template(
            "{\n  \"score\": 0\n}\nJOB: {job}",
            &[("job", "Backend role")],
        );
        assert_eq!(filled, "{\n  \"score\": 0\n}\nJOB: Backend role");
    }

    #[test]
    fn test_fill_template_does_not_expand_substituted_text() {
        let filled = fill_template(
            "JD: {job_description}\nCV: {candidate_resume}",
            &[
                ("job_description", "Paste {candidate_resume} here"),
                ("candidate_resume", "Jane Doe"),
            ],
        );
        assert_eq!(filled, "JD: Paste {candidate_resume} here\nCV: Jane Doe");
    }

    #[test]
    fn test_every_generation_placeholder_is_filled() {
        let filled = fill_template(
            GENERATION_PROMPT_TEMPLATE,
            &[
                ("themes", "t"),
                ("grounding_instruction", "g"),
                ("job_description", "j"),
                ("candidate_resume", "c"),
                ("company_vision_section", ""),
            ],
        );
        for name in [
            "{themes}",
            "{grounding_instruction}",
            "{job_description}",
            "{candidate_resume}",
            "{company_vision_section}",
        ] {
            assert!(!filled.contains(name), "{name} left unfilled");
        }
    }
}
