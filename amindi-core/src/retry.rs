//! Bounded retry with linear backoff and a per-attempt timeout.
//!
//! The policy is plain data ([`RetryPolicy`]) so it can be loaded from config
//! and tested without any HTTP involved. [`retry_with_backoff`] drives an
//! operation through the [`AttemptState`] machine:
//!
//! ```text
//! NotStarted -> Attempting(0) -> Succeeded
//!                             -> Attempting(n + 1)   while n < max_retries
//!                             -> Exhausted
//! ```

use std::{fmt::Display, future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Base delay; retry `n` waits `n` times this, and consecutive
    /// locations are separated by it once.
    pub delay_between_requests_ms: u64,
    /// Upper bound for a single attempt.
    pub attempt_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, delay_between_requests_ms: 800, attempt_timeout_ms: 5000 }
    }
}

impl RetryPolicy {
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn delay_between_requests(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Wait before the `retry`-th retry (0 is the first try and never waits).
    pub fn backoff_before(&self, retry: u32) -> Duration {
        Duration::from_millis(self.delay_between_requests_ms.saturating_mul(u64::from(retry)))
    }
}

/// Per-location fetch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    NotStarted,
    /// Attempting with `n` retries already spent.
    Attempting(u32),
    Succeeded,
    Exhausted,
}

impl AttemptState {
    pub fn begin(self) -> Self {
        match self {
            Self::NotStarted => Self::Attempting(0),
            other => other,
        }
    }

    pub fn succeed(self) -> Self {
        match self {
            Self::Attempting(_) => Self::Succeeded,
            other => other,
        }
    }

    pub fn fail(self, policy: &RetryPolicy) -> Self {
        match self {
            Self::Attempting(n) if n < policy.max_retries => Self::Attempting(n + 1),
            Self::Attempting(_) => Self::Exhausted,
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Exhausted)
    }
}

/// Outcome of one failed attempt.
#[derive(Debug, Error)]
pub enum AttemptError<E> {
    #[error("{0}")]
    Failed(E),
    #[error("attempt timed out after {0:?}")]
    TimedOut(Duration),
    #[error("no attempt was made")]
    NotAttempted,
}

/// Every attempt allowed by the policy failed.
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {last}")]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: AttemptError<E>,
}

/// Run `op` until it succeeds or the policy's retry budget is spent.
///
/// `op` receives the number of retries already spent. Each call is wrapped in
/// a timeout; when it fires the attempt future is dropped, which aborts any
/// in-flight request it owns.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut state = AttemptState::NotStarted.begin();
    let mut last = None;

    while let AttemptState::Attempting(retry) = state {
        if retry > 0 {
            let backoff = policy.backoff_before(retry);
            debug!(retry, backoff_ms = backoff.as_millis() as u64, "backing off before retry");
            tokio::time::sleep(backoff).await;
        }

        let error = match tokio::time::timeout(policy.attempt_timeout(), op(retry)).await {
            Ok(Ok(value)) => {
                state = state.succeed();
                debug!(attempt = retry + 1, ?state, "attempt succeeded");
                return Ok(value);
            }
            Ok(Err(err)) => AttemptError::Failed(err),
            Err(_) => AttemptError::TimedOut(policy.attempt_timeout()),
        };

        warn!(attempt = retry + 1, max = policy.total_attempts(), "attempt failed: {error}");

        last = Some((retry + 1, error));
        state = state.fail(policy);
    }

    debug_assert!(state.is_terminal());

    // `begin` yields `Attempting`, so at least one attempt ran before exhaustion.
    match last {
        Some((attempts, last)) => Err(RetryExhausted { attempts, last }),
        None => Err(RetryExhausted { attempts: 0, last: AttemptError::NotAttempted }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };
    use tokio::time::Instant;

    fn failing_until(
        successful_call: u32,
    ) -> (Arc<AtomicU32>, impl FnMut(u32) -> std::future::Ready<Result<u32, String>>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let op = move |_retry: u32| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n >= successful_call { Ok(n) } else { Err(format!("boom #{n}")) })
        };
        (calls, op)
    }

    #[test]
    fn default_policy_matches_upstream_limits() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.total_attempts(), 4);
        assert_eq!(policy.delay_between_requests(), Duration::from_millis(800));
        assert_eq!(policy.attempt_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn backoff_grows_linearly() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..4).map(|r| policy.backoff_before(r).as_millis()).collect();
        assert_eq!(delays, [0, 800, 1600, 2400]);
    }

    #[test]
    fn state_machine_transitions() {
        let policy = RetryPolicy { max_retries: 1, ..RetryPolicy::default() };

        let state = AttemptState::NotStarted.begin();
        assert_eq!(state, AttemptState::Attempting(0));

        let state = state.fail(&policy);
        assert_eq!(state, AttemptState::Attempting(1));
        assert!(!state.is_terminal());

        let exhausted = state.fail(&policy);
        assert_eq!(exhausted, AttemptState::Exhausted);
        assert!(exhausted.is_terminal());
        assert_eq!(exhausted.fail(&policy), AttemptState::Exhausted);
        assert_eq!(exhausted.succeed(), AttemptState::Exhausted);

        assert_eq!(AttemptState::Attempting(1).succeed(), AttemptState::Succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_last_allowed_attempt() {
        let policy = RetryPolicy::default();
        let (calls, op) = failing_until(4);

        let start = Instant::now();
        let value = retry_with_backoff(&policy, op).await.expect("fourth attempt succeeds");

        assert_eq!(value, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 800 + 1600 + 2400 ms of backoff
        assert_eq!(start.elapsed(), Duration::from_millis(4800));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_budget() {
        let policy = RetryPolicy::default();
        let (calls, op) = failing_until(5);

        let err = retry_with_backoff(&policy, op).await.unwrap_err();

        assert_eq!(err.attempts, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(matches!(err.last, AttemptError::Failed(ref msg) if msg == "boom #4"));
    }

    #[tokio::test(start_paused = true)]
    async fn first_try_success_does_not_wait() {
        let (calls, op) = failing_until(1);

        let start = Instant::now();
        retry_with_backoff(&RetryPolicy::default(), op).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempt_counts_as_timed_out_failure() {
        let policy = RetryPolicy { max_retries: 0, ..RetryPolicy::default() };

        let err = retry_with_backoff(&policy, |_| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, String>(())
        })
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 1);
        assert!(matches!(err.last, AttemptError::TimedOut(d) if d == Duration::from_millis(5000)));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retry_policy_makes_a_single_attempt() {
        let policy = RetryPolicy { max_retries: 0, ..RetryPolicy::default() };
        let (calls, op) = failing_until(2);

        let start = Instant::now();
        let err = retry_with_backoff(&policy, op).await.unwrap_err();

        assert_eq!(err.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(err.to_string(), "gave up after 1 attempts: boom #1");
    }
}
