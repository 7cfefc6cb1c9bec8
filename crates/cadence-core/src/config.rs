//! Engine tunables.

use std::time::Duration;

/// Thresholds and constants used by the assignment, gating, and audit
/// stages. [`EngineConfig::default`] matches the production policy.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Hours of the day posts may be scheduled at.
    pub peak_hours: Vec<u32>,
    /// Minimum hours between any two consecutive posts.
    pub min_hours_between_posts: i64,
    /// Minimum hours between two posts in the same channel, also the
    /// persona cooldown per channel.
    pub min_hours_same_channel: i64,
    /// A persona may not author this share (percent) of posts or more.
    pub max_persona_usage_percent: f64,
    /// Score at or above which a candidate is accepted immediately.
    pub quality_threshold: f64,
    /// Best score at or above which an exhausted gate still accepts.
    pub min_acceptable_quality: f64,
    /// Generation attempts per artifact.
    pub max_regeneration_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            peak_hours: vec![9, 10, 11, 18, 19, 20],
            min_hours_between_posts: 8,
            min_hours_same_channel: 48,
            max_persona_usage_percent: 40.0,
            quality_threshold: 7.5,
            min_acceptable_quality: 6.0,
            max_regeneration_attempts: 3,
        }
    }
}

/// Backoff settings for text generators that talk to a remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each subsequent one.
    pub base_delay: Duration,
    /// Pause before every call to respect the upstream rate limit.
    pub pacing: Duration,
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(15),
            pacing: Duration::from_secs(15),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            pacing: Duration::ZERO,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
    }

    #[test]
    fn default_policy_matches_production_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.peak_hours, vec![9, 10, 11, 18, 19, 20]);
        assert_eq!(cfg.quality_threshold, 7.5);
        assert_eq!(cfg.max_regeneration_attempts, 3);
    }
}
