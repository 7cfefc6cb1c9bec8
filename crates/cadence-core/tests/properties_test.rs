//! Property-based tests for the structure phase.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use cadence_core::assign::{
    KeywordState, PersonaLimits, PersonaState, assign_keywords, assign_personas,
};
use cadence_core::models::{Keyword, Persona};
use cadence_core::schedule::{channel_counts, distribute, schedule_posts};

fn channels(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("r/c{i}")).collect()
}

fn keyword_pool(n: usize) -> Vec<Keyword> {
    (1..=n)
        .map(|i| Keyword {
            keyword_id: format!("K{i}"),
            keyword: format!("keyword {i}"),
        })
        .collect()
}

fn persona_pool(n: usize) -> Vec<Persona> {
    (0..n)
        .map(|i| Persona {
            username: format!("user{i}"),
            info: String::new(),
        })
        .collect()
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

/// Channel counts differ by at most one.
#[test]
fn distribution_is_balanced_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(1usize..60, 1usize..8), |(posts, n_channels)| {
            let chans = channels(n_channels);
            let slots = distribute(posts, &chans);
            prop_assert_eq!(slots.len(), posts);

            let counts = channel_counts(&slots);
            let used: Vec<usize> = chans
                .iter()
                .map(|c| counts.get(c.as_str()).copied().unwrap_or(0))
                .collect();
            let max = used.iter().max().copied().unwrap_or(0);
            let min = used.iter().min().copied().unwrap_or(0);
            prop_assert!(max - min <= 1);
            Ok(())
        })
        .unwrap();
}

/// Every post gets one to three distinct, known keywords.
#[test]
fn keyword_count_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(1usize..30, 1usize..5, 1usize..12, any::<u64>()),
            |(posts, n_channels, n_keywords, seed)| {
                let slots = distribute(posts, &channels(n_channels));
                let pool = keyword_pool(n_keywords);
                let ids: HashSet<&str> = pool.iter().map(|k| k.keyword_id.as_str()).collect();
                let mut state = KeywordState::default();
                let mut rng = StdRng::seed_from_u64(seed);

                let assignments = assign_keywords(&slots, &pool, &mut state, &mut rng);
                prop_assert_eq!(assignments.len(), posts);

                for a in &assignments {
                    prop_assert!((1..=3).contains(&a.keywords.len()));
                    let distinct: HashSet<&str> =
                        a.keywords.iter().map(|k| k.keyword_id.as_str()).collect();
                    prop_assert_eq!(distinct.len(), a.keywords.len());
                    prop_assert!(distinct.is_subset(&ids));
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Within a channel no keyword id comes back until that channel's cycle has
/// been reset, and every observed reuse is accounted for by a reset.
#[test]
fn keyword_no_repeat_within_channel_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(1usize..30, 1usize..4, 1usize..10, any::<u64>()),
            |(posts, n_channels, n_keywords, seed)| {
                let slots = distribute(posts, &channels(n_channels));
                let pool = keyword_pool(n_keywords);
                let mut state = KeywordState::default();
                let mut rng = StdRng::seed_from_u64(seed);

                let assignments = assign_keywords(&slots, &pool, &mut state, &mut rng);

                let mut seen: HashMap<&str, HashSet<&str>> = HashMap::new();
                let mut observed_resets = 0usize;
                for (slot, a) in slots.iter().zip(&assignments) {
                    let used = seen.entry(slot.channel.as_str()).or_default();
                    if a.keywords.iter().any(|k| used.contains(k.keyword_id.as_str())) {
                        used.clear();
                        observed_resets += 1;
                    }
                    for k in &a.keywords {
                        prop_assert!(used.insert(k.keyword_id.as_str()));
                    }
                }
                prop_assert!(observed_resets <= state.resets);
                Ok(())
            },
        )
        .unwrap();
}

/// Every pick without fallback is made while the persona is below the share
/// limit, so a persona's final count minus one stays under 40% of posts.
#[test]
fn persona_share_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(1usize..25, 1usize..4, 1usize..7, any::<u64>()),
            |(posts, n_channels, n_personas, seed)| {
                let mut rng = StdRng::seed_from_u64(seed);
                let slots = distribute(posts, &channels(n_channels));
                let scheduled = schedule_posts(&slots, start(), &[9, 10, 11, 18, 19, 20], &mut rng);
                let personas = persona_pool(n_personas);
                let limits = PersonaLimits {
                    max_usage_percent: 40.0,
                    channel_cooldown_hours: 48,
                };
                let mut state = PersonaState::default();

                let assignments = assign_personas(&scheduled, &personas, limits, &mut state, &mut rng);
                prop_assert_eq!(assignments.len(), posts);

                let mut counts: HashMap<&str, usize> = HashMap::new();
                for a in &assignments {
                    *counts.entry(a.persona.as_str()).or_insert(0) += 1;
                }
                let over = counts
                    .values()
                    .any(|&c| (c - 1) as f64 / posts as f64 >= 0.4);
                prop_assert!(!over || state.fallback_used());
                Ok(())
            },
        )
        .unwrap();
}
