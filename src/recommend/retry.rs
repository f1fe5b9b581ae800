//! Retry controller for upstream calls.
//!
//! Implements capped exponential backoff over a bounded number of attempts.

use super::error::RecommendError;
use crate::config::RetrySettings;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 700;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.7;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 4000;

/// Retry policy implementing exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, the first one included.
    pub max_attempts: u32,
    /// Wait before the second attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Multiplier applied to the wait after each failed attempt.
    pub backoff_multiplier: f64,
    /// Cap for a single wait, in milliseconds.
    pub max_backoff_ms: u64,
}

/// Outcome of a retried operation together with the number of attempts made.
#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T, RecommendError>,
    pub attempts: u32,
}

impl<T> Attempted<T> {
    pub fn into_result(self) -> Result<T, RecommendError> {
        self.result
    }
}

impl RetryPolicy {
    /// Create a new RetryPolicy from configuration settings.
    pub fn new(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_backoff_ms: settings.initial_backoff_ms,
            backoff_multiplier: settings.backoff_multiplier,
            max_backoff_ms: settings.max_backoff_ms,
        }
    }

    /// Wait after the failed attempt with the given zero-based index.
    ///
    /// `initial_backoff * multiplier^attempt_index`, capped at `max_backoff_ms`.
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        let backoff =
            self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(attempt_index as i32);
        Duration::from_millis(backoff.min(self.max_backoff_ms as f64).round() as u64)
    }

    /// Whether the attempt with the given zero-based index should be followed by another.
    pub fn should_retry(&self, error: &RecommendError, attempt_index: u32) -> bool {
        error.is_retriable() && attempt_index + 1 < self.max_attempts
    }

    /// Runs `attempt` until it succeeds, fails with a non-retriable error, or
    /// the attempt budget is spent.
    ///
    /// Cancellation is checked before each attempt and raced against both the
    /// attempt and the backoff sleep; it ends the loop at once with
    /// [`RecommendError::Cancelled`].
    pub async fn run<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> Attempted<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RecommendError>>,
    {
        let mut attempt_index = 0;
        loop {
            if cancel.is_cancelled() {
                return Attempted {
                    result: Err(RecommendError::Cancelled),
                    attempts: attempt_index,
                };
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(RecommendError::Cancelled),
                outcome = attempt() => outcome,
            };
            let attempts = attempt_index + 1;

            let error = match outcome {
                Ok(value) => {
                    return Attempted {
                        result: Ok(value),
                        attempts,
                    }
                }
                Err(error) => error,
            };

            if !self.should_retry(&error, attempt_index) {
                debug!(attempts, error = %error, "Giving up on upstream call");
                return Attempted {
                    result: Err(with_attempt_count(error, attempts)),
                    attempts,
                };
            }

            let wait = self.backoff(attempt_index);
            warn!(
                attempt = attempts,
                max_attempts = self.max_attempts,
                status = ?error.status(),
                wait_ms = wait.as_millis() as u64,
                error = %error,
                "Upstream attempt failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Attempted {
                        result: Err(RecommendError::Cancelled),
                        attempts,
                    };
                }
                _ = tokio::time::sleep(wait) => {}
            }
            attempt_index += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
        }
    }
}

/// Rewrites a final 503 to say how many attempts were made. Anything else
/// passes through untouched.
fn with_attempt_count(error: RecommendError, attempts: u32) -> RecommendError {
    if error.status() != Some(503) {
        return error;
    }
    let noun = if attempts == 1 { "attempt" } else { "attempts" };
    RecommendError::upstream(
        503,
        format!(
            "Gemini is overloaded and still unavailable after {} {}. Please wait a moment and try again.",
            attempts, noun
        ),
    )
}
