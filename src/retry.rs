//! Bounded retry with fixed or linear backoff
//!
//! Attempts are numbered from zero. After every failed attempt, including the
//! last one, the policy sleeps for `backoff.delay(attempt)` before moving on.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every attempt
    Fixed(Duration),
    /// `step * attempt + base` after attempt `attempt`
    Linear { step: Duration, base: Duration },
}

impl Backoff {
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Linear { step, base } => step * attempt + base,
        }
    }
}

/// Maximum attempts plus the backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

/// Outcome of an exhausted or aborted retry loop
#[derive(Debug)]
pub struct RetryError<E> {
    /// Attempts actually made
    pub attempts: u32,
    /// Error from the last attempt
    pub last_error: E,
}

impl RetryPolicy {
    /// Navigation schedule: 1s, 4s, 7s, ... after each failure
    pub fn navigation(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Linear {
                step: Duration::from_secs(3),
                base: Duration::from_secs(1),
            },
        }
    }

    /// Text input schedule: 1s after each failure
    pub fn input(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(Duration::from_secs(1)),
        }
    }

    /// Run `operation` until it succeeds, attempts run out, or `retryable`
    /// rejects an error
    ///
    /// A policy with `max_attempts == 0` still makes one attempt.
    pub async fn run<T, E, F, Fut, R>(
        &self,
        label: &str,
        mut operation: F,
        retryable: R,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{} attempt {}/{} failed: {}", label, attempt + 1, max_attempts, e);

                    let give_up = !retryable(&e);
                    if !give_up {
                        tokio::time::sleep(self.backoff.delay(attempt)).await;
                    }
                    attempt += 1;

                    if give_up || attempt >= max_attempts {
                        return Err(RetryError {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                }
            }
        }
    }
}
