//! Retry classification and backoff policy.

use std::time::Duration;

use rand::Rng;
use thiserror::Error;

/// A single failed transfer attempt, as seen by the retry loop.
#[derive(Error, Debug, Clone)]
pub enum AttemptError {
    /// The remote service answered with a non-success status.
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport-level fault: connection reset, incomplete read, bad status
    /// line, local I/O failure and the like.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outcome of classifying a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryDecision {
    pub retriable: bool,
    pub delay: Duration,
}

/// Retry configuration for the upload engine.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries before giving up.
    pub max_retries: u32,

    /// Status codes presumed transient and safe to retry.
    pub retriable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retriable_statuses: vec![500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Whether an attempt failure is safe to retry.
    ///
    /// Transport faults always are; remote errors only when their status is
    /// in the retriable set.
    pub fn classify(&self, error: &AttemptError) -> bool {
        match error {
            AttemptError::Status { status, .. } => self.retriable_statuses.contains(status),
            AttemptError::Transport(_) => true,
        }
    }

    /// Classify a failure and, if retriable, draw the backoff delay for the
    /// given retry attempt (1-indexed).
    ///
    /// Full jitter: uniform in `[0, 2^attempt)` seconds.
    pub fn decide<R: Rng>(
        &self,
        error: &AttemptError,
        attempt: u32,
        rng: &mut R,
    ) -> RetryDecision {
        if !self.classify(error) {
            return RetryDecision {
                retriable: false,
                delay: Duration::ZERO,
            };
        }

        let max_sleep = 2f64.powi(attempt as i32);
        let sleep_seconds = rng.gen::<f64>() * max_sleep;

        RetryDecision {
            retriable: true,
            delay: Duration::from_secs_f64(sleep_seconds),
        }
    }
}
