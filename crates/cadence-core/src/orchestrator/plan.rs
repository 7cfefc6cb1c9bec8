//! Phase 1: turn a validated request into one [`PostPlan`] per post.

use std::collections::HashMap;

use chrono::NaiveDate;
use rand::Rng;

use super::request::CalendarRequest;
use crate::assign::{
    AssignmentState, PersonaLimits, assign_keywords, assign_personas, select_strategy,
};
use crate::config::EngineConfig;
use crate::models::{PostPlan, StructureReport};
use crate::schedule::{distribute, schedule_posts, validate_distribution, validate_timing};

/// Output of the structure phase.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPlan {
    /// Plans in post-number order (P1, P2, ...).
    pub posts: Vec<PostPlan>,
    pub structure: StructureReport,
}

/// Distribute, schedule, and assign keywords, strategy, and persona.
///
/// Keywords are assigned in post-number order; personas in chronological
/// order so per-channel cooldowns compare against earlier posts.
pub fn plan_week<R: Rng + ?Sized>(
    request: &CalendarRequest,
    start: NaiveDate,
    config: &EngineConfig,
    state: &mut AssignmentState,
    rng: &mut R,
) -> WeekPlan {
    let company = &request.company;

    let slots = distribute(company.posts_per_week, &company.subreddits);
    let distribution_balanced = validate_distribution(&slots);
    if !distribution_balanced {
        tracing::warn!(
            posts = slots.len(),
            channels = company.subreddits.len(),
            "one channel holds more than half of the posts"
        );
    }

    let scheduled = schedule_posts(&slots, start, &config.peak_hours, rng);
    let timing = validate_timing(
        &scheduled,
        config.min_hours_between_posts,
        config.min_hours_same_channel,
    );
    if !timing.is_valid() {
        tracing::warn!(
            global_gap_ok = timing.global_gap_ok,
            channel_gap_ok = timing.channel_gap_ok,
            "schedule violates spacing rules"
        );
    }

    let keywords = assign_keywords(&slots, &request.keywords, &mut state.keywords, rng);

    let limits = PersonaLimits {
        max_usage_percent: config.max_persona_usage_percent,
        channel_cooldown_hours: config.min_hours_same_channel,
    };
    let personas = assign_personas(&scheduled, &request.personas, limits, &mut state.personas, rng);

    let instants: HashMap<&str, _> = scheduled
        .iter()
        .map(|s| (s.post_id.as_str(), s.instant))
        .collect();
    let authors: HashMap<&str, _> = personas
        .iter()
        .map(|p| (p.post_id.as_str(), p))
        .collect();

    let posts: Vec<PostPlan> = slots
        .iter()
        .zip(keywords)
        .filter_map(|(slot, kw)| {
            let instant = *instants.get(slot.post_id.as_str())?;
            let author = authors.get(slot.post_id.as_str())?;
            Some(PostPlan {
                post_id: slot.post_id.clone(),
                channel: slot.channel.clone(),
                instant,
                persona: author.persona.clone(),
                persona_info: author.persona_info.clone(),
                strategy: select_strategy(&kw.keywords),
                keywords: kw.keywords,
            })
        })
        .collect();

    if state.personas.fallback_used() {
        tracing::warn!(
            fallbacks = state.personas.fallbacks,
            "persona limits could not be met, least-used persona assigned"
        );
    }

    tracing::info!(
        posts = posts.len(),
        keyword_resets = state.keywords.resets,
        "structure phase complete"
    );

    WeekPlan {
        posts,
        structure: StructureReport {
            distribution_balanced,
            global_gap_ok: timing.global_gap_ok,
            channel_gap_ok: timing.channel_gap_ok,
            persona_fallback_used: state.personas.fallback_used(),
        },
    }
}
