//! Keyword assignment with per-channel non-repetition.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::{DistributionSlot, Keyword};

/// Usage tracking for keyword assignment.
///
/// Owned by the caller and threaded through [`assign_keywords`]; a fresh
/// state starts a fresh cycle for every channel.
#[derive(Debug, Clone, Default)]
pub struct KeywordState {
    /// Total times each keyword id has been assigned.
    pub usage: HashMap<String, usize>,
    /// Keyword ids used in each channel since that channel's last reset.
    pub used_in_channel: HashMap<String, HashSet<String>>,
    /// Number of times a channel cycle was reset.
    pub resets: usize,
}

/// Keywords chosen for one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordAssignment {
    pub post_id: String,
    pub keywords: Vec<Keyword>,
}

/// Attach 1-3 keywords to every slot.
///
/// For each slot a target count `c` is drawn from `{1, 2, 3}`. Keywords
/// already used in the slot's channel this cycle are skipped. When fewer
/// than `c` remain, the channel's cycle resets and the pool is reshuffled;
/// the still-eligible keywords are used if there are any, otherwise the
/// reshuffled pool. Never blocks, and yields at least one keyword per slot
/// whenever `keywords` is non-empty.
pub fn assign_keywords<R: Rng + ?Sized>(
    slots: &[DistributionSlot],
    keywords: &[Keyword],
    state: &mut KeywordState,
    rng: &mut R,
) -> Vec<KeywordAssignment> {
    for k in keywords {
        state.usage.entry(k.keyword_id.clone()).or_insert(0);
    }

    let mut pool = keywords.to_vec();
    pool.shuffle(rng);

    let mut assignments = Vec::with_capacity(slots.len());

    for slot in slots {
        let target: usize = rng.random_range(1..=3);
        let used = state.used_in_channel.entry(slot.channel.clone()).or_default();

        let eligible: Vec<Keyword> = pool
            .iter()
            .filter(|k| !used.contains(&k.keyword_id))
            .cloned()
            .collect();

        if eligible.len() < target {
            used.clear();
            state.resets += 1;
            pool = keywords.to_vec();
            pool.shuffle(rng);
            tracing::debug!(channel = %slot.channel, "keyword cycle reset");
        }

        let source = if eligible.is_empty() { &pool } else { &eligible };
        let selected: Vec<Keyword> = source.iter().take(target).cloned().collect();

        for k in &selected {
            *state.usage.entry(k.keyword_id.clone()).or_insert(0) += 1;
            used.insert(k.keyword_id.clone());
        }

        assignments.push(KeywordAssignment {
            post_id: slot.post_id.clone(),
            keywords: selected,
        });
    }

    assignments
}
