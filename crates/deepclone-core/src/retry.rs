//! Bounded retry combinator
//!
//! [`with_retry`] runs an async operation up to [`RetryPolicy::max_attempts`]
//! times. Which errors are worth another attempt is declared by the caller
//! through an `is_retryable` predicate, so the policy lives at the call site:
//!
//! ```rust,ignore
//! with_retry(policy, StoreError::is_version_conflict, |attempt| async move {
//!     store.update(&id, version_for(attempt).await?, fields.clone()).await
//! })
//! .await
//! ```

use std::fmt::Display;
use std::future::Future;

/// How many times an operation may be attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Policy allowing `max_attempts` attempts in total (at least one)
    #[inline]
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Single attempt, never retried
    #[inline]
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Total attempts allowed
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up.
///
/// `op` receives the 1-based attempt number. Returns the first success or the
/// last error.
pub async fn with_retry<T, E, P, F, Fut>(policy: RetryPolicy, is_retryable: P, mut op: F) -> Result<T, E>
where
    E: Display,
    P: Fn(&E) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts && is_retryable(&err) => {
                tracing::warn!(attempt, max_attempts = policy.max_attempts, error = %err, "retrying");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
