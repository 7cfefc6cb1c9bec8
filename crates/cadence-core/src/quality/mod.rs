//! Quality scoring of generated text.
//!
//! [`QualityScorer`] is the seam the regeneration gate scores through;
//! [`HeuristicScorer`] is the default keyword/regex policy.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{QualityBreakdown, QualityScore};

/// The text being scored, tagged with its kind.
#[derive(Debug, Clone, Copy)]
pub enum ScoreTarget<'a> {
    Post { title: &'a str, body: &'a str },
    Comment { text: &'a str },
}

impl ScoreTarget<'_> {
    fn text(&self) -> String {
        match self {
            Self::Post { title, body } => format!("{title} {body}"),
            Self::Comment { text } => (*text).to_owned(),
        }
    }

    fn is_comment(&self) -> bool {
        matches!(self, Self::Comment { .. })
    }
}

/// Rates a piece of generated text on a 0-10 scale.
pub trait QualityScorer: Send + Sync {
    fn score(&self, target: ScoreTarget<'_>) -> QualityScore;
}

const WEIGHT_NATURALNESS: f64 = 0.35;
const WEIGHT_AUTHENTICITY: f64 = 0.35;
const WEIGHT_ENGAGEMENT: f64 = 0.15;
const WEIGHT_STRATEGIC: f64 = 0.15;

const BUZZWORDS: &[&str] = &[
    "revolutionary",
    "game-changing",
    "cutting-edge",
    "innovative solution",
    "leverage",
    "synergy",
    "paradigm",
    "disruptive",
    "next-generation",
];

static FORMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Furthermore|Moreover|Subsequently|Accordingly)\b").expect("valid regex")
});
static CASUAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(honestly|tbh|lol|ngl|imo)\b").expect("valid regex"));
static PROMOTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(must-have|life-changing|absolutely|amazing tool)\b").expect("valid regex")
});
static FIRST_PERSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(I|my|I'm|I've)\b").expect("valid regex"));
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").expect("valid regex"));

/// Keyword and pattern heuristics over the raw text.
///
/// `product` is the name counted by the strategic dimension: one natural
/// mention is rewarded, none or more than two are penalised.
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    product: String,
}

impl HeuristicScorer {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into().to_lowercase(),
        }
    }

    fn naturalness(&self, text: &str, is_comment: bool) -> f64 {
        let mut score = 10.0;
        if FORMAL.is_match(text) {
            score -= 2.0;
        }
        if is_comment && !text.ends_with(['.', '!', '?']) {
            score += 0.5;
        }
        if CASUAL.is_match(text) {
            score += 1.0;
        }
        clamp(score)
    }

    fn authenticity(&self, text: &str) -> f64 {
        let mut score = 10.0;
        let lower = text.to_lowercase();
        let buzz = BUZZWORDS.iter().filter(|w| lower.contains(*w)).count();
        score -= 2.0 * buzz as f64;
        if text.matches('!').count() > 2 {
            score -= 1.0;
        }
        if PROMOTIONAL.is_match(text) {
            score -= 1.5;
        }
        clamp(score)
    }

    fn engagement(&self, text: &str) -> f64 {
        let mut score = 7.0;
        if text.contains('?') {
            score += 1.5;
        }
        if FIRST_PERSON.find_iter(text).count() > 2 {
            score += 1.0;
        }
        if NUMBER.is_match(text) {
            score += 0.5;
        }
        clamp(score)
    }

    fn strategic(&self, text: &str) -> f64 {
        let mentions = if self.product.is_empty() {
            0
        } else {
            text.to_lowercase().matches(self.product.as_str()).count()
        };
        let score = match mentions {
            0 => 8.0 - 2.0,
            1 => 8.0 + 1.0,
            2 => 8.0,
            _ => 8.0 - 3.0,
        };
        clamp(score)
    }
}

impl QualityScorer for HeuristicScorer {
    fn score(&self, target: ScoreTarget<'_>) -> QualityScore {
        let text = target.text();
        let breakdown = QualityBreakdown {
            naturalness: self.naturalness(&text, target.is_comment()),
            authenticity: self.authenticity(&text),
            engagement: self.engagement(&text),
            strategic: self.strategic(&text),
        };
        QualityScore {
            overall: overall(&breakdown),
            breakdown,
        }
    }
}

/// Weighted overall score, rounded to one decimal.
pub fn overall(b: &QualityBreakdown) -> f64 {
    let raw = b.naturalness * WEIGHT_NATURALNESS
        + b.authenticity * WEIGHT_AUTHENTICITY
        + b.engagement * WEIGHT_ENGAGEMENT
        + b.strategic * WEIGHT_STRATEGIC;
    round1(raw)
}

/// Round to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn clamp(score: f64) -> f64 {
    score.clamp(0.0, 10.0)
}
