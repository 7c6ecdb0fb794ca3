//! Theme extraction — tags a job description with themes and technology keywords.
//!
//! Deterministic keyword membership, no model call. Themes come first in declaration
//! order, then technologies in declaration order, capped at [`MAX_THEMES`].

use serde::Serialize;

pub const MAX_THEMES: usize = 8;

/// Theme name → lower-case variants; any variant occurring as a substring selects the theme.
const THEMES: &[(&str, &[&str])] = &[
    (
        "growth",
        &["growth", "acquisition", "retention", "monetization", "go-to-market"],
    ),
    (
        "experimentation",
        &["experiment", "a/b test", "hypothesis", "iteration"],
    ),
    (
        "leadership",
        &["leadership", "mentor", "lead a team", "manage a team", "people management", "cross-functional"],
    ),
    ("product", &["product", "roadmap", "customer", "user research"]),
    ("data", &["data", "analytics", "metrics", "insights", "dashboard"]),
    (
        "infrastructure",
        &["infrastructure", "devops", "ci/cd", "cloud", "distributed systems", "platform"],
    ),
    (
        "ai",
        &["machine learning", "artificial intelligence", "deep learning", "llm", "ml model"],
    ),
    ("security", &["security", "compliance", "privacy", "threat model"]),
    ("design", &["design", "user experience", "ux ", "prototyp"]),
    (
        "performance",
        &["performance", "scalab", "latency", "optimization", "reliability"],
    ),
];

const TECH_KEYWORDS: &[&str] = &[
    "python",
    "javascript",
    "typescript",
    "react",
    "node",
    "aws",
    "gcp",
    "azure",
    "docker",
    "kubernetes",
    "terraform",
    "sql",
    "graphql",
    "kafka",
    "spark",
];

/// Ordered, unique tags derived from a job description; never more than [`MAX_THEMES`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ThemeSet(Vec<String>);

impl ThemeSet {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

pub fn extract_themes(job_description: &str) -> ThemeSet {
    let text = job_description.to_lowercase();

    let themes = THEMES
        .iter()
        .filter(|(_, variants)| variants.iter().any(|v| text.contains(v)))
        .map(|(name, _)| *name);
    let technologies = TECH_KEYWORDS.iter().copied().filter(|k| text.contains(k));

    ThemeSet(
        themes
            .chain(technologies)
            .take(MAX_THEMES)
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_themes_then_technologies_in_order() {
        let themes =
            extract_themes("We need strong growth and experimentation skills with Python and AWS");
        assert_eq!(
            themes.as_slice(),
            &["growth", "experimentation", "python", "aws"]
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let themes = extract_themes("KUBERNETES and Terraform for our Cloud PLATFORM");
        assert_eq!(
            themes.as_slice(),
            &["infrastructure", "kubernetes", "terraform"]
        );
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(extract_themes("").is_empty());
        assert!(extract_themes("Friendly bakery seeks early riser").is_empty());
    }

    #[test]
    fn test_capped_at_eight_unique_entries() {
        let jd = "Growth, experiments, leadership, product roadmap, data analytics, \
                  cloud infrastructure, machine learning, security, design, performance. \
                  Python, TypeScript, React, AWS, Docker, Kubernetes, SQL, Kafka.";
        let themes = extract_themes(jd);
        assert_eq!(themes.as_slice().len(), MAX_THEMES);
        assert_eq!(themes.as_slice()[0], "growth");
        assert_eq!(themes.as_slice()[7], "security");

        let unique: HashSet<&String> = themes.as_slice().iter().collect();
        assert_eq!(unique.len(), themes.as_slice().len());
    }

    #[test]
    fn test_theme_names_and_keywords_do_not_collide() {
        for (name, _) in THEMES {
            assert!(!TECH_KEYWORDS.contains(name), "{name} is both a theme and a keyword");
        }
    }
}
