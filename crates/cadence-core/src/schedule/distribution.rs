//! Round-robin distribution of posts across channels.

use std::collections::HashMap;

use crate::models::{Channel, DistributionSlot};

/// Split `post_count` posts across `channels` in round-robin order.
///
/// Slot `i` lands in `channels[i % channels.len()]`, so no channel receives
/// more than `ceil(n / k)` posts. Returns no slots when `channels` is empty.
pub fn distribute(post_count: usize, channels: &[Channel]) -> Vec<DistributionSlot> {
    if channels.is_empty() {
        return Vec::new();
    }

    (0..post_count)
        .map(|i| DistributionSlot {
            post_number: i + 1,
            post_id: format!("P{}", i + 1),
            channel: channels[i % channels.len()].clone(),
        })
        .collect()
}

/// Number of slots per channel.
pub fn channel_counts(slots: &[DistributionSlot]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for slot in slots {
        *counts.entry(slot.channel.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Advisory check: `true` if no channel holds more than half the posts.
///
/// A single channel with any posts always fails. The result is reported,
/// never enforced.
pub fn validate_distribution(slots: &[DistributionSlot]) -> bool {
    if slots.is_empty() {
        return true;
    }
    let max = channel_counts(slots).into_values().max().unwrap_or(0);
    (max as f64 / slots.len() as f64) * 100.0 <= 50.0
}
