//! Auto-patching — neutralizes numbers in generated text that the original résumé never states.
//!
//! The generated side is scanned with a broader numeric pattern than the one used for
//! concern reporting, so comma-grouped integers like `1,200` are judged as one token.
//! Only the numeric token itself is rewritten; surrounding text is copied verbatim.
//!
//! Patch against the original résumé only. Re-running over already-patched text with
//! its own numbers as reference is not idempotent.

use std::collections::HashSet;

use serde::Serialize;

use crate::grounding::claims::{METRIC_RE, PATCH_METRIC_RE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchResult {
    pub text: String,
    pub changed: bool,
}

/// Replaces every numeric token in `generated` that does not appear verbatim among
/// the numeric tokens of `original` with a neutral qualifier.
pub fn patch_unsupported_metrics(generated: &str, original: &str) -> PatchResult {
    let supported: HashSet<&str> = METRIC_RE
        .find_iter(original)
        .chain(PATCH_METRIC_RE.find_iter(original))
        .map(|m| m.as_str())
        .collect();

    let mut text = String::with_capacity(generated.len());
    let mut last = 0;

    for token in PATCH_METRIC_RE.find_iter(generated) {
        if supported.contains(token.as_str()) {
            continue;
        }
        text.push_str(&generated[last..token.start()]);
        text.push_str(qualifier_for(token.as_str()));
        last = token.end();
    }
    text.push_str(&generated[last..]);

    let changed = text != generated;
    PatchResult { text, changed }
}

/// Picks a qualifier by token shape. Order is significant: `$5M` is currency, not magnitude.
fn qualifier_for(token: &str) -> &'static str {
    if token.starts_with('$') {
        "substantial"
    } else if token.ends_with('%') {
        "notable"
    } else if token.ends_with(|c: char| matches!(c, 'K' | 'M' | 'B' | 'k' | 'm' | 'b')) {
        "strong"
    } else if token.ends_with('+') {
        "notable"
    } else if token.chars().all(|c| c.is_ascii_digit() || c == ',') {
        "multiple"
    } else {
        "significant"
    }
}
