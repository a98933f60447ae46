use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use crate::core::error::ClientError;

/// Bounded retry with linearly growing delay (`base_delay * attempt`).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

/// What a retried call produced and how many attempts it took.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: Result<Vec<T>, ClientError>,
    pub attempts: usize,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn delay_after(&self, attempt: usize) -> Duration {
        self.base_delay
            .saturating_mul(u32::try_from(attempt).unwrap_or(u32::MAX))
    }

    /// Run `op` until it succeeds, reports no results, or fails terminally.
    ///
    /// `NoResults` yields an empty list with no retry. Network and timeout
    /// errors sleep on the calling thread and retry. Any other error, or the
    /// last retryable one, is returned as is.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Result<Vec<T>, ClientError>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(items) => {
                    return RetryOutcome { result: Ok(items), attempts: attempt };
                }
                Err(ClientError::NoResults) => {
                    debug!("{}: no results", label);
                    return RetryOutcome { result: Ok(Vec::new()), attempts: attempt };
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {:?}",
                        label, attempt, self.max_attempts, e, delay,
                    );
                    thread::sleep(delay);
                }
                Err(e) => {
                    return RetryOutcome { result: Err(e), attempts: attempt };
                }
            }
        }
    }
}
