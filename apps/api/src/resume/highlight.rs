//! Keyword highlighting over raw résumé text.
//!
//! Pure-Rust, no LLM call. Finds technical skills, soft skills and strong action
//! verbs as whole words, and weak filler phrases anywhere, then returns
//! non-overlapping byte spans for the front end to decorate.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const TECHNICAL_SKILLS: &[&str] = &[
    "python", "java", "c++", "c#", "javascript", "typescript", "sql", "nosql", "mongodb",
    "postgresql", "react", "angular", "vue", "node.js", "django", "flask", "spring", "aws",
    "azure", "gcp", "docker", "kubernetes", "terraform", "git", "jenkins", "jira", "tableau",
    "power bi", "machine learning", "deep learning", "tensorflow", "pytorch", "scikit-learn",
    "pandas", "numpy", "rust",
];

const SOFT_SKILLS: &[&str] = &[
    "leadership",
    "teamwork",
    "communication",
    "problem-solving",
    "critical thinking",
    "creativity",
    "adaptability",
    "time management",
    "collaboration",
    "work ethic",
    "interpersonal skills",
];

const ACTION_VERBS: &[&str] = &[
    "managed",
    "led",
    "developed",
    "engineered",
    "launched",
    "created",
    "increased",
    "reduced",
    "saved",
    "implemented",
    "spearheaded",
    "orchestrated",
    "achieved",
    "improved",
];

const WEAK_PHRASES: &[&str] = &[
    "responsible for",
    "assisted with",
    "worked on",
    "team player",
    "duties included",
    "highly motivated",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    TechnicalSkill,
    SoftSkill,
    ActionVerb,
    WeakPhrase,
}

/// A highlighted span. `start`/`end` are byte offsets into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub kind: HighlightKind,
}

struct Matcher {
    kind: HighlightKind,
    regex: Regex,
    whole_word: bool,
}

fn matchers() -> &'static [Matcher] {
    static MATCHERS: OnceLock<Vec<Matcher>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        vec![
            build(HighlightKind::WeakPhrase, WEAK_PHRASES, false),
            build(HighlightKind::TechnicalSkill, TECHNICAL_SKILLS, true),
            build(HighlightKind::SoftSkill, SOFT_SKILLS, true),
            build(HighlightKind::ActionVerb, ACTION_VERBS, true),
        ]
    })
}

fn build(kind: HighlightKind, terms: &[&str], whole_word: bool) -> Matcher {
    // Longest first so "javascript" wins over "java" at the same position.
    let mut terms: Vec<&str> = terms.to_vec();
    terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let regex = Regex::new(&format!("(?i)(?:{alternation})"))
        .unwrap_or_else(|e| panic!("highlight pattern for {kind:?} is invalid: {e}"));
    Matcher {
        kind,
        regex,
        whole_word,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The match must not be glued to a word character on either side.
fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Scans `text` and returns highlights sorted by position.
///
/// Overlaps resolve in favour of the earlier span, then the longer one; weak
/// phrases are matched first so "worked on" is not split by a skill inside it.
pub fn highlight(text: &str) -> Vec<Highlight> {
    let mut found: Vec<Highlight> = Vec::new();

    for matcher in matchers() {
        for m in matcher.regex.find_iter(text) {
            if matcher.whole_word && !on_word_boundary(text, m.start(), m.end()) {
                continue;
            }
            found.push(Highlight {
                start: m.start(),
                end: m.end(),
                text: m.as_str().to_string(),
                kind: matcher.kind,
            });
        }
    }

    found.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut result: Vec<Highlight> = Vec::with_capacity(found.len());
    for h in found {
        if result.last().map_or(true, |last| h.start >= last.end) {
            result.push(h);
        }
    }
    result
}
