//! Claim extraction — pulls metrics, organizations, job titles and technologies out of résumé text.
//!
//! Every extracted value is a literal slice of the input text. Capitalized-phrase
//! patterns (organizations, titles) are case-sensitive because capitalization is the
//! signal; the technology vocabulary is matched case-insensitively.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

const CURRENCY: &str = r"\$\d+(?:,\d{3})*(?:\.\d+)?[KMBkmb]?";
const DATE: &str = r"\b\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})\b";
const PERCENTAGE: &str = r"\b\d+(?:\.\d+)?%";
const MAGNITUDE: &str = r"\b\d+(?:\.\d+)?[KMBkmb]\b";
const PLUS_COUNT: &str = r"\b\d+\+";
const COMMA_GROUPED: &str = r"\b\d{1,3}(?:,\d{3})+\b";
const YEAR: &str = r"\b(?:19|20)\d{2}\b";
const DECIMAL: &str = r"\b\d+\.\d+\b";
const INTEGER: &str = r"\b\d+\b";

/// Numeric claims reported by the extractor. Alternation order matters: the
/// regex engine takes the first alternative that matches at a position.
pub(crate) static METRIC_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern =
        [CURRENCY, DATE, PERCENTAGE, MAGNITUDE, PLUS_COUNT, YEAR, DECIMAL, INTEGER].join("|");
    Regex::new(&pattern).expect("metric pattern is valid")
});

/// Broader numeric pattern used by the auto-patcher: also treats `1,200` as one token.
pub(crate) static PATCH_METRIC_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = [
        CURRENCY,
        DATE,
        PERCENTAGE,
        MAGNITUDE,
        PLUS_COUNT,
        COMMA_GROUPED,
        YEAR,
        DECIMAL,
        INTEGER,
    ]
    .join("|");
    Regex::new(&pattern).expect("patch metric pattern is valid")
});

/// One capitalized word. Horizontal whitespace only between words so a phrase
/// never runs across a line break.
const CAP_WORD: &str = r"[A-Z][A-Za-z0-9&'\-]*";

const CORPORATE_SUFFIXES: &str =
    "Inc|Corp|LLC|Ltd|Company|Technologies|Systems|Solutions|Labs|Group";

const WELL_KNOWN_EMPLOYERS: &[&str] = &[
    "Google",
    "Microsoft",
    "Amazon",
    "Apple",
    "Meta",
    "Facebook",
    "Netflix",
    "Stripe",
    "Airbnb",
    "Uber",
    "Salesforce",
    "Oracle",
    "IBM",
    "Intel",
    "Adobe",
    "Shopify",
    "Spotify",
    "LinkedIn",
    "Twitter",
    "Nvidia",
];

static ORGANIZATION_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let phrase = format!(r"{CAP_WORD}(?:[ \t]+{CAP_WORD})*");
    let employers = WELL_KNOWN_EMPLOYERS.join("|");
    [
        // cue word or label, then the name
        format!(
            r"(?:\b(?:worked at|at|joined)[ \t]+|@[ \t]*|\b(?:Company|Employer):[ \t]*)({phrase})"
        ),
        // name ending in a corporate suffix
        format!(r"\b({phrase}[ \t]+(?:{CORPORATE_SUFFIXES}))\b"),
        // well-known employer, optionally with one capitalized neighbour on each side
        format!(r"\b((?:{CAP_WORD}[ \t]+)?(?:{employers})\b(?:[ \t]+{CAP_WORD})?)"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("organization pattern is valid"))
    .collect()
});

const ROLE_WORDS: &str = "Senior|Lead|Principal|Staff|VP|Director|Manager|Engineer|Developer|\
                          Designer|Analyst|Scientist|Architect";

/// A role word and up to three following words of either case.
static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?:{ROLE_WORDS})\b(?:[ \t]+[A-Za-z&][A-Za-z0-9+#/&\-]*){{0,3}}"
    ))
    .expect("title pattern is valid")
});

/// Words that end a title ("Engineer at Acme", "Senior engineer on payments").
const TITLE_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "at", "in", "on", "with", "by", "from", "to", "as", "via", "using",
    "during", "since", "across", "into", "over", "where", "who", "that", "while",
];

/// May join title words but never end a title ("Director of Engineering").
const TITLE_CONNECTORS: &[&str] = &["of", "and", "for", "&"];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("word pattern is valid"));

/// Closed vocabulary of platforms, languages, data stores and practices.
const TECHNOLOGIES: &[&str] = &[
    "Python",
    "JavaScript",
    "TypeScript",
    "Java",
    "Golang",
    "Rust",
    "C++",
    "Kotlin",
    "Swift",
    "React",
    "Angular",
    "Vue",
    "Node.js",
    "Next.js",
    "Django",
    "Flask",
    "Spring",
    "AWS",
    "GCP",
    "Azure",
    "Docker",
    "Kubernetes",
    "Terraform",
    "PostgreSQL",
    "MySQL",
    "MongoDB",
    "Redis",
    "Kafka",
    "Elasticsearch",
    "Spark",
    "GraphQL",
    "TensorFlow",
    "PyTorch",
    "Machine Learning",
    "CI/CD",
    "Microservices",
    "Agile",
    "Scrum",
];

static TECHNOLOGY_RE: Lazy<Regex> = Lazy::new(|| {
    // Longest first so "JavaScript" wins over "Java" at the same position.
    let mut terms: Vec<&str> = TECHNOLOGIES.to_vec();
    terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alternation})")).expect("technology pattern is valid")
});

const MIN_ORGANIZATION_CHARS: usize = 3;
const MAX_ORGANIZATION_CHARS: usize = 49;

// ────────────────────────────────────────────────────────────────────────────
// Data model
// ────────────────────────────────────────────────────────────────────────────

/// The four claim categories, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimCategory {
    Metrics,
    Organizations,
    Titles,
    Technologies,
}

impl ClaimCategory {
    pub const ALL: [ClaimCategory; 4] = [
        ClaimCategory::Metrics,
        ClaimCategory::Organizations,
        ClaimCategory::Titles,
        ClaimCategory::Technologies,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ClaimCategory::Metrics => "Metrics",
            ClaimCategory::Organizations => "Organizations",
            ClaimCategory::Titles => "Job titles",
            ClaimCategory::Technologies => "Technologies",
        }
    }
}

/// Claims found in one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// In order of appearance, duplicates kept.
    pub metrics: Vec<String>,
    pub organizations: Vec<String>,
    pub titles: Vec<String>,
    pub technologies: Vec<String>,
}

impl ClaimSet {
    pub fn values(&self, category: ClaimCategory) -> &[String] {
        match category {
            ClaimCategory::Metrics => &self.metrics,
            ClaimCategory::Organizations => &self.organizations,
            ClaimCategory::Titles => &self.titles,
            ClaimCategory::Technologies => &self.technologies,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts all four claim categories from `text`. Total: empty input gives an empty set.
pub fn extract_claims(text: &str) -> ClaimSet {
    ClaimSet {
        metrics: extract_metrics(text),
        organizations: extract_organizations(text),
        titles: extract_titles(text),
        technologies: extract_technologies(text),
    }
}

fn extract_metrics(text: &str) -> Vec<String> {
    METRIC_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn extract_organizations(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut organizations = Vec::new();

    for re in ORGANIZATION_RES.iter() {
        for caps in re.captures_iter(text) {
            let Some(name) = caps.get(1) else { continue };
            let name = trim_trailing_punctuation(name.as_str());
            let len = name.chars().count();
            if !(MIN_ORGANIZATION_CHARS..=MAX_ORGANIZATION_CHARS).contains(&len) {
                continue;
            }
            if seen.insert(name) {
                organizations.push(name.to_string());
            }
        }
    }

    organizations
}

/// Candidates are scanned from each role word onwards. A candidate keeps its words
/// up to the first stop word, minus trailing connectors; a bare role word is not a title.
fn extract_titles(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut titles = Vec::new();
    let mut pos = 0;

    while let Some(candidate) = TITLE_RE.find_at(text, pos) {
        let mut words = WORD_RE.find_iter(candidate.as_str());
        let Some(role) = words.next() else { break };

        let mut end = role.end();
        for word in words {
            let lower = word.as_str().to_lowercase();
            if TITLE_STOP_WORDS.contains(&lower.as_str()) {
                break;
            }
            if !TITLE_CONNECTORS.contains(&lower.as_str()) {
                end = word.end();
            }
        }

        if end > role.end() {
            let title = trim_trailing_punctuation(&candidate.as_str()[..end]);
            if seen.insert(title) {
                titles.push(title.to_string());
            }
        }
        pos = candidate.start() + end;
    }

    titles
}

fn extract_technologies(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TECHNOLOGY_RE
        .find_iter(text)
        .filter(|m| is_word_bounded(text, m.start(), m.end()))
        .map(|m| m.as_str())
        .filter(|term| seen.insert(term.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// The regex crate has no lookaround, and `\b` misbehaves next to `+` and `.`
/// ("C++", "Node.js"), so boundaries are checked by hand.
fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}

fn trim_trailing_punctuation(value: &str) -> &str {
    value
        .trim_end_matches(|c: char| c.is_whitespace() || ".,;:!?)'\"-&".contains(c))
        .trim()
}
