//! # Polling
//!
//! Fixed-interval polling under an overall deadline.
//!
//! Used wherever the pipeline waits for something that is "not ready yet"
//! rather than failed, such as a receipt that has not been mined.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep, timeout};
use tracing::debug;

/// Why polling stopped without a value.
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The deadline passed before a value appeared.
    #[error("deadline exceeded after {waited:?}")]
    DeadlineExceeded {
        /// Time spent polling.
        waited: Duration,
    },

    /// The operation returned an error that should not be retried.
    #[error("aborted: {0}")]
    Aborted(E),
}

/// Polling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between attempts.
    pub interval: Duration,
    /// Overall deadline, measured from the first attempt.
    pub max_wait: Duration,
}

impl PollPolicy {
    /// Creates a new policy.
    #[must_use]
    pub const fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    /// Polls `operation` until it yields `Some`, fails with a
    /// non-retryable error, or the deadline passes.
    ///
    /// `Ok(None)` and retryable errors both mean "try again after the
    /// interval".
    ///
    /// # Errors
    ///
    /// Returns [`PollError::DeadlineExceeded`] on timeout, or
    /// [`PollError::Aborted`] with the first non-retryable error.
    pub async fn poll_until<T, E, F, Fut, R>(
        &self,
        mut operation: F,
        is_retryable: R,
    ) -> Result<T, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        R: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let started = Instant::now();
        let interval = self.interval;

        let attempts = async {
            let mut attempt: u32 = 0;
            loop {
                attempt = attempt.saturating_add(1);
                match operation().await {
                    Ok(Some(value)) => return Ok(value),
                    Ok(None) => {
                        debug!(attempt, "not ready, polling again");
                    }
                    Err(e) if is_retryable(&e) => {
                        debug!(attempt, error = %e, "retryable error while polling");
                    }
                    Err(e) => return Err(PollError::Aborted(e)),
                }
                sleep(interval).await;
            }
        };

        match timeout(self.max_wait, attempts).await {
            Ok(result) => result,
            Err(_) => Err(PollError::DeadlineExceeded {
                waited: started.elapsed(),
            }),
        }
    }
}
