//! Retry wrapper for transient failures.
//!
//! Persistence failures and version conflicts are safe to retry at the
//! operation level: the engine re-reads the current request on each
//! attempt, so a conflicting concurrent write is picked up rather than
//! overwritten.

use std::thread;
use std::time::Duration;

use tracing::warn;

use fiscus_core::workflow::WorkflowError;
use fiscus_shared::RetryConfig;

/// Runs an operation, retrying retryable errors with doubling backoff.
///
/// Non-retryable errors and the final retryable failure are returned
/// as-is. The closure is expected to re-read current state on each call.
pub fn with_retry<T, F>(config: &RetryConfig, mut op: F) -> Result<T, WorkflowError>
where
    F: FnMut() -> Result<T, WorkflowError>,
{
    let mut backoff = Duration::from_millis(config.backoff_ms);
    let mut attempt = 1u32;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < config.max_attempts => {
                warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %err,
                    "retryable failure, backing off"
                );
                thread::sleep(backoff);
                backoff *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
