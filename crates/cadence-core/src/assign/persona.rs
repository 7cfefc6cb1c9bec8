//! Persona assignment under usage-share and per-channel cooldown limits.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::{Persona, ScheduledSlot};

/// Usage tracking for persona assignment.
#[derive(Debug, Clone, Default)]
pub struct PersonaState {
    /// Posts assigned to each username so far.
    pub usage: HashMap<String, usize>,
    /// Last instant each username posted in each channel.
    pub last_assigned: HashMap<String, HashMap<String, DateTime<Utc>>>,
    /// Slots that fell back to the least-used persona.
    pub fallbacks: usize,
}

impl PersonaState {
    /// Whether any slot was assigned through the unconditional fallback,
    /// which may break the share or cooldown limits.
    pub fn fallback_used(&self) -> bool {
        self.fallbacks > 0
    }
}

/// Author chosen for one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaAssignment {
    pub post_id: String,
    pub persona: String,
    pub persona_info: String,
}

/// Limits enforced while probing candidates.
#[derive(Debug, Clone, Copy)]
pub struct PersonaLimits {
    /// A persona is eligible while its share stays below this percentage.
    pub max_usage_percent: f64,
    /// Minimum hours between two posts by one persona in one channel.
    pub channel_cooldown_hours: i64,
}

/// Assign an author to every scheduled slot, in the order given.
///
/// Walks a shuffled persona ring for at most `2 * personas.len()` probes,
/// taking the first persona whose share of all posts is below the limit and
/// whose last post in this channel (if any) is at least the cooldown ago.
/// When no candidate qualifies, the least-used persona is taken regardless
/// of the limits and the fallback is counted in `state`.
pub fn assign_personas<R: Rng + ?Sized>(
    scheduled: &[ScheduledSlot],
    personas: &[Persona],
    limits: PersonaLimits,
    state: &mut PersonaState,
    rng: &mut R,
) -> Vec<PersonaAssignment> {
    if personas.is_empty() {
        return Vec::new();
    }

    for p in personas {
        state.usage.entry(p.username.clone()).or_insert(0);
        state.last_assigned.entry(p.username.clone()).or_default();
    }

    let mut ring: Vec<&Persona> = personas.iter().collect();
    ring.shuffle(rng);

    let total = scheduled.len() as f64;
    let cooldown = TimeDelta::hours(limits.channel_cooldown_hours);
    let mut cursor = 0usize;
    let mut assignments = Vec::with_capacity(scheduled.len());

    for slot in scheduled {
        let mut selected: Option<&Persona> = None;

        for _ in 0..personas.len() * 2 {
            let candidate = ring[cursor % ring.len()];
            cursor += 1;

            let used = state.usage.get(&candidate.username).copied().unwrap_or(0);
            if (used as f64 / total) * 100.0 >= limits.max_usage_percent {
                continue;
            }

            let cooled_down = state
                .last_assigned
                .get(&candidate.username)
                .and_then(|channels| channels.get(&slot.channel))
                .is_none_or(|last| slot.instant - *last >= cooldown);

            if cooled_down {
                selected = Some(candidate);
                break;
            }
        }

        let persona = match selected {
            Some(p) => p,
            None => {
                state.fallbacks += 1;
                let least = least_used(personas, &state.usage);
                tracing::debug!(
                    post_id = %slot.post_id,
                    persona = %least.username,
                    "no persona within limits, falling back to least used"
                );
                least
            }
        };

        *state.usage.entry(persona.username.clone()).or_insert(0) += 1;
        state
            .last_assigned
            .entry(persona.username.clone())
            .or_default()
            .insert(slot.channel.clone(), slot.instant);

        assignments.push(PersonaAssignment {
            post_id: slot.post_id.clone(),
            persona: persona.username.clone(),
            persona_info: persona.info.clone(),
        });
    }

    assignments
}

/// Least-used persona; ties go to the earliest in input order.
fn least_used<'a>(personas: &'a [Persona], usage: &HashMap<String, usize>) -> &'a Persona {
    let count = |p: &Persona| usage.get(&p.username).copied().unwrap_or(0);
    let mut best = &personas[0];
    for p in &personas[1..] {
        if count(p) < count(best) {
            best = p;
        }
    }
    best
}
