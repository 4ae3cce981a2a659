//! Bullet impact heuristics shared by both score functions.
//!
//! A bullet is quantified when it carries any concrete measure: a digit, `%`,
//! a currency sign, a `~N` estimate or an explicit `[LOW_METRICS]` marker.
//! Unquantified bullets are checked for vague verbs and vague scale words so
//! the scorer can say *why* a bullet reads weak.

const VAGUE_VERBS: &[&str] = &[
    "improved",
    "enhanced",
    "helped",
    "worked on",
    "assisted",
    "supported",
    "participated",
    "involved",
    "responsible for",
];

const VAGUE_SCALE_WORDS: &[&str] = &[
    "significant",
    "major",
    "large",
    "huge",
    "massive",
    "substantial",
    "considerable",
    "great",
    "many",
    "numerous",
    "various",
    "several",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ImpactIssue {
    VagueVerb(String),
    VagueScale(String),
    NoMetric,
}

impl ImpactIssue {
    pub fn describe(&self) -> String {
        match self {
            ImpactIssue::VagueVerb(verb) => {
                format!("Replace the vague verb '{verb}' with a measurable outcome")
            }
            ImpactIssue::VagueScale(word) => {
                format!("Replace '{word}' with a specific number or percentage")
            }
            ImpactIssue::NoMetric => "Add a number, percentage or time saved".to_string(),
        }
    }
}

pub fn is_quantified(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        || text.contains("[LOW_METRICS]")
        || text.contains('%')
        || text.contains('$')
        || text.contains('€')
        || text.contains('£')
}

/// Returns `None` for a quantified bullet, otherwise the first weakness found.
pub fn impact_issue(text: &str) -> Option<ImpactIssue> {
    if is_quantified(text) {
        return None;
    }

    let lower = text.to_lowercase();
    if let Some(verb) = VAGUE_VERBS.iter().find(|v| lower.contains(**v)) {
        return Some(ImpactIssue::VagueVerb(verb.to_string()));
    }
    if let Some(word) = VAGUE_SCALE_WORDS
        .iter()
        .find(|w| lower.split(|c: char| !c.is_alphanumeric()).any(|t| t == **w))
    {
        return Some(ImpactIssue::VagueScale(word.to_string()));
    }
    Some(ImpactIssue::NoMetric)
}

/// Share of bullets that are quantified, 0.0 – 1.0. Empty input scores 0.0.
pub fn quantified_ratio<'a>(bullets: impl IntoIterator<Item = &'a str>) -> f64 {
    let mut total = 0usize;
    let mut quantified = 0usize;
    for bullet in bullets {
        total += 1;
        if is_quantified(bullet) {
            quantified += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        quantified as f64 / total as f64
    }
}
