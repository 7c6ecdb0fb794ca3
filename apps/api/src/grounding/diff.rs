//! Claim diffing — reports claims in generated text that the original résumé does not support.
//!
//! Advisory only. Concerns are attached to the response for transparency; they never
//! reject or retry a generation.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::grounding::claims::{ClaimCategory, ClaimSet};

/// One category of generated claims with no counterpart in the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Concern {
    pub category: ClaimCategory,
    /// Unsupported values in order of first appearance, without repeats.
    pub values: Vec<String>,
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} not found in the original résumé: {}",
            self.category.label(),
            self.values.join(", ")
        )
    }
}

/// Compares `generated` claims against `original` claims, category by category.
///
/// A generated value is supported when some original value in the same category
/// contains it or is contained by it (case-insensitive), or equals it once case and
/// whitespace are ignored. Categories are reported in the fixed order of
/// [`ClaimCategory::ALL`]; categories with nothing unsupported are omitted.
pub fn diff_claims(generated: &ClaimSet, original: &ClaimSet) -> Vec<Concern> {
    ClaimCategory::ALL
        .iter()
        .filter_map(|&category| {
            let values = unsupported_values(generated.values(category), original.values(category));
            (!values.is_empty()).then_some(Concern { category, values })
        })
        .collect()
}

fn unsupported_values(generated: &[String], original: &[String]) -> Vec<String> {
    let original: Vec<(String, String)> = original
        .iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| (value.to_lowercase(), squash_whitespace(value)))
        .collect();

    let mut seen = HashSet::new();
    generated
        .iter()
        .filter(|value| !value.trim().is_empty())
        .filter(|value| !is_supported(value, &original))
        .filter(|value| seen.insert(value.as_str()))
        .cloned()
        .collect()
}

fn is_supported(value: &str, original: &[(String, String)]) -> bool {
    let lower = value.to_lowercase();
    let squashed = squash_whitespace(value);
    original.iter().any(|(orig_lower, orig_squashed)| {
        lower.contains(orig_lower.as_str())
            || orig_lower.contains(lower.as_str())
            || *orig_squashed == squashed
    })
}

/// Lower-cases and drops all whitespace.
fn squash_whitespace(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
