//! Post timestamps: peak-hour placement across the week.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::models::{DistributionSlot, ScheduledSlot};

/// Outcome of [`validate_timing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingCheck {
    /// Consecutive posts are at least the global gap apart.
    pub global_gap_ok: bool,
    /// Consecutive posts in the same channel are at least the channel gap apart.
    pub channel_gap_ok: bool,
}

impl TimingCheck {
    pub fn is_valid(&self) -> bool {
        self.global_gap_ok && self.channel_gap_ok
    }
}

/// Assign each slot an instant and return them sorted chronologically.
///
/// Slot `i` of `n` lands on day `floor(i * 7 / n)` after `start`, at a
/// random peak hour and a random minute, with zero seconds. Sorting is
/// required because random hours on a shared day can invert the order.
pub fn schedule_posts<R: Rng + ?Sized>(
    slots: &[DistributionSlot],
    start: NaiveDate,
    peak_hours: &[u32],
    rng: &mut R,
) -> Vec<ScheduledSlot> {
    let n = slots.len();
    let midnight = start.and_time(NaiveTime::MIN);

    let mut scheduled: Vec<ScheduledSlot> = slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let day_offset = (i * 7 / n) as i64;
            let hour = peak_hours.choose(rng).copied().unwrap_or_default();
            let minute: u32 = rng.random_range(0..60);

            let instant = midnight
                + TimeDelta::days(day_offset)
                + TimeDelta::hours(i64::from(hour))
                + TimeDelta::minutes(i64::from(minute));

            ScheduledSlot {
                post_id: slot.post_id.clone(),
                instant: instant.and_utc(),
                channel: slot.channel.clone(),
            }
        })
        .collect();

    scheduled.sort_by_key(|s| s.instant);
    scheduled
}

/// Advisory check of spacing rules over chronologically sorted slots.
///
/// The scheduler does not enforce these gaps; the result is reported
/// alongside the calendar.
pub fn validate_timing(
    scheduled: &[ScheduledSlot],
    min_hours_between_posts: i64,
    min_hours_same_channel: i64,
) -> TimingCheck {
    let global_gap_ok = scheduled
        .windows(2)
        .all(|w| w[1].instant - w[0].instant >= TimeDelta::hours(min_hours_between_posts));

    let mut by_channel: HashMap<&str, Vec<_>> = HashMap::new();
    for slot in scheduled {
        by_channel
            .entry(slot.channel.as_str())
            .or_default()
            .push(slot.instant);
    }

    let channel_gap_ok = by_channel.into_values().all(|mut times| {
        times.sort();
        times
            .windows(2)
            .all(|w| w[1] - w[0] >= TimeDelta::hours(min_hours_same_channel))
    });

    TimingCheck {
        global_gap_ok,
        channel_gap_ok,
    }
}
