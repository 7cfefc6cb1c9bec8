//! Quality gate: drives a generator until its output scores well enough.
//!
//! Each attempt is scored through a [`QualityScorer`] and handed to
//! [`evaluator::evaluate`]. The best candidate is kept across attempts so
//! the gate always returns something; low quality yields
//! [`GateOutcome::Degraded`] rather than an error. Only generator failures
//! surface as `Err`.

pub mod evaluator;

use std::future::Future;

use crate::error::GenerationError;
use crate::models::QualityScore;
use crate::quality::{QualityScorer, ScoreTarget};

pub use evaluator::{GateAction, GatePolicy, evaluate};

/// Warning attached to artifacts the gate could not bring up to standard.
pub const DEGRADED_WARNING: &str = "Quality below acceptable threshold";

/// Generated content that can be handed to a scorer.
pub trait Scorable {
    fn score_target(&self) -> ScoreTarget<'_>;
}

/// A candidate together with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub content: T,
    pub score: QualityScore,
    /// 1-based attempt that produced this candidate.
    pub attempt: u32,
}

/// Result of running the gate for one artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome<T> {
    /// A candidate cleared the threshold, or the best one was acceptable.
    Accepted { best: Scored<T>, attempts: u32 },
    /// Every attempt fell short; the best candidate is kept with a warning.
    Degraded {
        best: Scored<T>,
        attempts: u32,
        warning: String,
    },
}

impl<T> GateOutcome<T> {
    pub fn best(&self) -> &Scored<T> {
        match self {
            Self::Accepted { best, .. } | Self::Degraded { best, .. } => best,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Accepted { attempts, .. } | Self::Degraded { attempts, .. } => *attempts,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Accepted { .. } => None,
            Self::Degraded { warning, .. } => Some(warning),
        }
    }

    /// Split into the kept candidate and its warning, if any.
    pub fn into_parts(self) -> (Scored<T>, Option<String>) {
        match self {
            Self::Accepted { best, .. } => (best, None),
            Self::Degraded { best, warning, .. } => (best, Some(warning)),
        }
    }
}

/// Runs generation attempts under a [`GatePolicy`].
pub struct QualityGate<'a> {
    scorer: &'a dyn QualityScorer,
    policy: GatePolicy,
}

impl<'a> QualityGate<'a> {
    pub fn new(scorer: &'a dyn QualityScorer, policy: GatePolicy) -> Self {
        Self { scorer, policy }
    }

    /// Call `generate` (with the 1-based attempt number) until a candidate
    /// is accepted or attempts run out.
    ///
    /// Ties between equally scored candidates keep the earliest.
    pub async fn run<T, F, Fut>(
        &self,
        label: &str,
        mut generate: F,
    ) -> Result<GateOutcome<T>, GenerationError>
    where
        T: Scorable,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let mut best: Option<Scored<T>> = None;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let content = generate(attempt).await?;
            let score = self.scorer.score(content.score_target());

            tracing::debug!(
                artifact = label,
                attempt,
                score = score.overall,
                "scored candidate"
            );

            let candidate = Scored {
                content,
                score,
                attempt,
            };

            if score.overall >= self.policy.threshold {
                tracing::info!(artifact = label, attempt, score = score.overall, "quality accepted");
                return Ok(GateOutcome::Accepted {
                    best: candidate,
                    attempts: attempt,
                });
            }

            let improved = best
                .as_ref()
                .is_none_or(|b| candidate.score.overall > b.score.overall);
            if improved {
                best = Some(candidate);
            }

            let best_score = best.as_ref().map_or(score.overall, |b| b.score.overall);

            match evaluate(&self.policy, attempt, score.overall, best_score) {
                GateAction::Retry => continue,
                GateAction::Accept | GateAction::AcceptBest => {
                    if let Some(best) = best {
                        tracing::info!(
                            artifact = label,
                            attempts = attempt,
                            score = best.score.overall,
                            "attempts exhausted, keeping best candidate"
                        );
                        return Ok(GateOutcome::Accepted {
                            best,
                            attempts: attempt,
                        });
                    }
                }
                GateAction::Degrade => {
                    if let Some(best) = best {
                        tracing::warn!(
                            artifact = label,
                            attempts = attempt,
                            score = best.score.overall,
                            "quality below acceptable threshold"
                        );
                        return Ok(GateOutcome::Degraded {
                            best,
                            attempts: attempt,
                            warning: DEGRADED_WARNING.to_string(),
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::models::QualityBreakdown;

    /// Content whose score is carried in the text itself.
    #[derive(Debug, Clone, PartialEq)]
    struct Fixed(String);

    impl Scorable for Fixed {
        fn score_target(&self) -> ScoreTarget<'_> {
            ScoreTarget::Comment { text: &self.0 }
        }
    }

    /// Scorer that parses the text as the overall score.
    struct ParseScorer;

    impl QualityScorer for ParseScorer {
        fn score(&self, target: ScoreTarget<'_>) -> QualityScore {
            let ScoreTarget::Comment { text } = target else {
                unreachable!("tests only score comments")
            };
            let overall: f64 = text.split(':').next().unwrap().parse().unwrap();
            QualityScore {
                overall,
                breakdown: QualityBreakdown::default(),
            }
        }
    }

    async fn run_script(script: &[&str]) -> (GateOutcome<Fixed>, usize) {
        let queue = Mutex::new(script.iter().map(|s| s.to_string()).collect::<VecDeque<_>>());
        let calls = Mutex::new(0usize);
        let gate = QualityGate::new(&ParseScorer, GatePolicy::default());
        let outcome = gate
            .run("test", |_| {
                *calls.lock().unwrap() += 1;
                let next = queue.lock().unwrap().pop_front().unwrap();
                async move { Ok::<_, GenerationError>(Fixed(next)) }
            })
            .await
            .unwrap();
        let calls = *calls.lock().unwrap();
        (outcome, calls)
    }

    #[tokio::test]
    async fn first_good_attempt_is_accepted_after_one_call() {
        let (outcome, calls) = run_script(&["9.0", "1.0", "1.0"]).await;
        assert_eq!(calls, 1);
        assert_eq!(outcome.attempts(), 1);
        assert!(outcome.warning().is_none());
        assert_eq!(outcome.best().content, Fixed("9.0".into()));
    }

    #[tokio::test]
    async fn third_attempt_can_clear_threshold() {
        let (outcome, calls) = run_script(&["5.0", "6.0", "8.0"]).await;
        assert_eq!(calls, 3);
        assert!(matches!(outcome, GateOutcome::Accepted { attempts: 3, .. }));
        assert_eq!(outcome.best().score.overall, 8.0);
    }

    #[tokio::test]
    async fn exhausted_with_low_scores_degrades_to_first_best() {
        let (outcome, calls) = run_script(&["5.0:a", "5.0:b", "5.0:c"]).await;
        assert_eq!(calls, 3);
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(outcome.warning(), Some(DEGRADED_WARNING));
        assert_eq!(outcome.best().content, Fixed("5.0:a".into()));
        assert_eq!(outcome.best().attempt, 1);
    }

    #[tokio::test]
    async fn exhausted_with_acceptable_best_has_no_warning() {
        let (outcome, _) = run_script(&["5.0", "6.5", "6.0"]).await;
        assert!(outcome.warning().is_none());
        assert_eq!(outcome.best().score.overall, 6.5);
        assert_eq!(outcome.best().attempt, 2);
    }

    #[tokio::test]
    async fn generator_error_propagates() {
        let gate = QualityGate::new(&ParseScorer, GatePolicy::default());
        let result = gate
            .run("test", |_| async {
                Err::<Fixed, _>(GenerationError::Request("down".into()))
            })
            .await;
        assert!(matches!(result, Err(GenerationError::Request(_))));
    }
}
