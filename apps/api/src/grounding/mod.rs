// Grounding: checks generated résumé text against the candidate's original résumé.
// Pure, synchronous string transformations; safe to call from any handler concurrently.

pub mod claims;
pub mod diff;
pub mod patch;

use claims::extract_claims;
use diff::{diff_claims, Concern};
use patch::{patch_unsupported_metrics, PatchResult};

/// Outcome of grounding one generated résumé.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingReview {
    /// Generated text after unsupported numbers were neutralized.
    pub text: String,
    pub auto_patched: bool,
    pub concerns: Vec<Concern>,
}

/// Patches unsupported numbers in `generated`, then diffs the patched text's claims
/// against `original` to collect advisory concerns.
pub fn review_generated(generated: &str, original: &str) -> GroundingReview {
    let PatchResult { text, changed } = patch_unsupported_metrics(generated, original);
    let concerns = diff_claims(&extract_claims(&text), &extract_claims(original));

    GroundingReview {
        text,
        auto_patched: changed,
        concerns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounding::claims::ClaimCategory;

    const ORIGINAL: &str = "\
Software Engineer at Acme Corp (2020-2023)
- Built billing services in Python on AWS
- Reduced infra cost by 20%";

    #[test]
    fn test_faithful_rewrite_passes_clean() {
        let generated = "\
Software Engineer, Acme Corp (2020-2023)
- Reduced infrastructure cost by 20% building Python billing services on AWS";
        let review = review_generated(generated, ORIGINAL);
        assert!(!review.auto_patched);
        assert_eq!(review.text, generated);
        assert!(review.concerns.is_empty(), "{:?}", review.concerns);
    }

    #[test]
    fn test_fabrications_are_patched_and_flagged() {
        let generated = "\
Principal Engineer at Globex Systems (2020-2023)
- Reduced infra cost by 35% with Kubernetes on AWS";
        let review = review_generated(generated, ORIGINAL);

        assert!(review.auto_patched);
        assert!(review.text.contains("by notable with"));
        assert!(review.text.contains("(2020-2023)"));

        let categories: Vec<ClaimCategory> = review.concerns.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![
                ClaimCategory::Organizations,
                ClaimCategory::Titles,
                ClaimCategory::Technologies
            ]
        );
    }
}
