//! Keyword-driven post strategy selection.

use crate::models::{Keyword, Strategy};

/// Ordered classification rules; the first rule with a matching cue wins.
const RULES: &[(&[&str], Strategy)] = &[
    (&["best", "vs", "alternative"], Strategy::ComparisonSeeking),
    (&["how to", "help", "need"], Strategy::ProblemSolving),
    (
        &["recommend", "suggest", "looking for"],
        Strategy::RecommendationRequest,
    ),
    (&["experience", "anyone tried"], Strategy::ExperienceSharing),
];

/// Classify a post from its keywords.
///
/// Cues are plain substring matches over the lowercased keyword texts joined
/// with spaces. Falls back to [`Strategy::GenuineQuestion`].
pub fn select_strategy(keywords: &[Keyword]) -> Strategy {
    let text = keywords
        .iter()
        .map(|k| k.keyword.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    RULES
        .iter()
        .find(|(cues, _)| cues.iter().any(|cue| text.contains(cue)))
        .map(|(_, strategy)| *strategy)
        .unwrap_or(Strategy::GenuineQuestion)
}
