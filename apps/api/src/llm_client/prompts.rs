// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to generation prompts.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Every fact in the résumé must come from the candidate's original résumé. \
    Do NOT invent employers, job titles, technologies, dates, or metrics. \
    If a number is not stated in the original résumé, describe the impact without one.";
