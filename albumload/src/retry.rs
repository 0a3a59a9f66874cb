use crate::client::CreatedAlbum;
use crate::collector::ResultLog;
use albumload_core::{RequestOutcome, DEFAULT_MAX_ATTEMPTS};
use std::future::Future;
use std::num::NonZeroUsize;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Anything produced by a single network attempt.
pub trait Attempt {
    fn outcome(&self) -> &RequestOutcome;
}

impl Attempt for RequestOutcome {
    fn outcome(&self) -> &RequestOutcome {
        self
    }
}

impl Attempt for CreatedAlbum {
    fn outcome(&self) -> &RequestOutcome {
        &self.outcome
    }
}

/// Bounded, immediate retry of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: NonZeroUsize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: NonZeroUsize) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> NonZeroUsize {
        self.max_attempts
    }

    /// Invokes `operation` until it succeeds or `max_attempts` invocations were made, and
    /// returns the last result either way. Every attempt is appended to `log`.
    pub async fn attempt<T, F, Fut>(&self, mut operation: F, log: &ResultLog) -> T
    where
        T: Attempt,
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut attempts = 0;
        loop {
            let res = operation().await;
            attempts += 1;

            let outcome = res.outcome();
            log.append(outcome.clone());

            if outcome.is_success() {
                return res;
            }

            if attempts >= self.max_attempts.get() {
                warn!(
                    "{} failed after {attempts} attempts (status {})",
                    outcome.kind(),
                    outcome.status()
                );
                return res;
            }

            trace!(
                "{} attempt {attempts} failed with status {}, retrying",
                outcome.kind(),
                outcome.status()
            );
        }
    }
}
