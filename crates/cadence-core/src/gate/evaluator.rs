//! Gate decision: translates one scored attempt into a [`GateAction`].

use crate::config::EngineConfig;

/// Thresholds the quality gate applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatePolicy {
    /// Accept immediately at or above this score.
    pub threshold: f64,
    /// After the last attempt, accept the best candidate at or above this.
    pub min_acceptable: f64,
    /// Attempts before the gate gives up.
    pub max_attempts: u32,
}

impl From<&EngineConfig> for GatePolicy {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            threshold: cfg.quality_threshold,
            min_acceptable: cfg.min_acceptable_quality,
            max_attempts: cfg.max_regeneration_attempts.max(1),
        }
    }
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

/// What to do after scoring an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// The current candidate clears the threshold.
    Accept,
    /// Below threshold with attempts left.
    Retry,
    /// Out of attempts; the best candidate is good enough to keep silently.
    AcceptBest,
    /// Out of attempts; keep the best candidate with a warning.
    Degrade,
}

/// Decide the next step after `attempt` (1-based) scored `score`, where
/// `best` is the best score seen so far including this attempt.
pub fn evaluate(policy: &GatePolicy, attempt: u32, score: f64, best: f64) -> GateAction {
    if score >= policy.threshold {
        GateAction::Accept
    } else if attempt < policy.max_attempts {
        GateAction::Retry
    } else if best >= policy.min_acceptable {
        GateAction::AcceptBest
    } else {
        GateAction::Degrade
    }
}
