//! Pacing and transient-failure retry for remote generators.

use std::future::Future;

use crate::config::RetryPolicy;
use crate::error::GenerationError;

/// Run `call` under `policy`.
///
/// Every attempt is preceded by the pacing delay. Transient failures (see
/// [`GenerationError::is_transient`]) are retried after
/// `base_delay * 2^attempt`; once attempts run out they become
/// [`GenerationError::Exhausted`]. Any other failure is returned at once.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut call: F,
) -> Result<T, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        if !policy.pacing.is_zero() {
            tokio::time::sleep(policy.pacing).await;
        }

        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => {
                if attempt >= max_attempts {
                    tracing::error!(request = label, attempts = attempt, error = %err, "retries exhausted");
                    return Err(GenerationError::Exhausted {
                        attempts: attempt,
                        message: err.to_string(),
                    });
                }
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    request = label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient generator failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
