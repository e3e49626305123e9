//! Backoff executors
//!
//! [`Backoff`] (async) and [`BlockingBackoff`] wrap an operation so that one
//! `call` runs it repeatedly until a comparator accepts the result or the
//! policy's attempts are used up. Between attempts the executor waits
//! [`BackoffPolicy::delay_for`] through its sleeper.
//!
//! Semantics shared by both flavours:
//! - the first attempt always runs, so `retries = 0` still executes once;
//! - a delay follows every rejected attempt, including the last one, so an
//!   exhausted call has waited exactly `policy.total_delay(attempts)`;
//! - an accepted result returns immediately with no further delay;
//! - operation errors (`try_call`) are returned at once and never retried.

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::policy::BackoffPolicy;
use crate::error::{ErrorClassification, ErrorSeverity};
use crate::time::{BlockingSleeper, Sleeper, ThreadSleeper, TokioSleeper};

/// Errors returned by a backoff call
#[derive(Debug, Error)]
pub enum BackoffError<T, E = Infallible> {
    /// Every attempt was rejected by the comparator
    #[error("Backoff exhausted after {attempts} attempts without an accepted result")]
    Exhausted {
        /// Attempts made before giving up
        attempts: u32,
        /// The last rejected result
        last: T,
    },

    /// The operation itself failed; this is never retried
    #[error("Operation failed: {0}")]
    Operation(E),
}

impl<T, E> BackoffError<T, E> {
    /// Whether the call gave up after using all attempts
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Attempts made before giving up, if exhausted
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Exhausted { attempts, .. } => Some(*attempts),
            Self::Operation(_) => None,
        }
    }

    /// Take the last rejected result, if exhausted
    pub fn into_last(self) -> Option<T> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::Operation(_) => None,
        }
    }
}

impl<T, E> ErrorClassification for BackoffError<T, E> {
    fn is_retryable(&self) -> bool {
        // A later call may see a different result; an operation error is the
        // operation's own verdict.
        self.is_exhausted()
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Exhausted { .. } => ErrorSeverity::Warning,
            Self::Operation(_) => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }
}

/// Result type for backoff calls
pub type BackoffResult<T, E = Infallible> = Result<T, BackoffError<T, E>>;

/// Outcome of a backoff call including summary statistics.
#[derive(Debug)]
pub struct BackoffOutcome<T, E = Infallible> {
    /// Accepted result or the reason the call gave up
    pub result: BackoffResult<T, E>,
    /// Attempts made, including the last one
    pub attempts: u32,
    /// Every delay issued, in order
    pub delays: Vec<Duration>,
    /// Sum of `delays`
    pub total_delay: Duration,
}

impl<T, E> BackoffOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> BackoffResult<T, E> {
        self.result
    }

    /// Get the average delay issued per rejected attempt.
    pub fn average_delay(&self) -> Duration {
        match u32::try_from(self.delays.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(count) => self.total_delay / count,
        }
    }
}

/// Loop state for one call; built fresh every time.
struct Attempts<'a> {
    policy: &'a BackoffPolicy,
    remaining: u32,
    exponent: u32,
    attempts: u32,
    delays: Vec<Duration>,
    total_delay: Duration,
}

impl<'a> Attempts<'a> {
    fn new(policy: &'a BackoffPolicy) -> Self {
        Self {
            policy,
            remaining: policy.retries,
            exponent: 0,
            attempts: 0,
            delays: Vec::new(),
            total_delay: Duration::ZERO,
        }
    }

    fn begin(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
        debug!("Executing operation (attempt {}/{})", self.attempts, self.policy.attempts());
    }

    /// Record a rejection and return the delay to wait before deciding
    /// whether to continue.
    fn reject(&mut self) -> Duration {
        self.remaining = self.remaining.saturating_sub(1);
        let delay = self.policy.delay_for(self.exponent);
        warn!("Result rejected (attempt {}), backing off for {:?}", self.attempts, delay);
        delay
    }

    /// Book the completed delay; returns `true` when attempts remain.
    fn waited(&mut self, delay: Duration) -> bool {
        self.delays.push(delay);
        self.total_delay = self.total_delay.saturating_add(delay);
        self.exponent = self.exponent.saturating_add(1);
        self.remaining > 0
    }

    fn finish<T, E>(self, result: BackoffResult<T, E>) -> BackoffOutcome<T, E> {
        match &result {
            Ok(_) if self.attempts > 1 => {
                debug!("Result accepted after {} retries", self.attempts - 1);
            }
            Err(BackoffError::Exhausted { attempts, .. }) => {
                warn!(
                    "Backoff exhausted after {} attempts (waited {:?})",
                    attempts, self.total_delay
                );
            }
            Err(BackoffError::Operation(_)) => {
                debug!("Operation failed on attempt {}; not retrying", self.attempts);
            }
            Ok(_) => {}
        }
        BackoffOutcome {
            result,
            attempts: self.attempts,
            delays: self.delays,
            total_delay: self.total_delay,
        }
    }
}

/// Async backoff wrapper around an operation
///
/// The operation receives a clone of the arguments passed to [`call`] on
/// every attempt. Passing a receiver (for example an `Arc<Service>`) as the
/// argument binds the operation to it.
///
/// [`call`]: Backoff::call
///
/// ```rust
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use cadence_common::testing::MockSleeper;
/// use cadence_common::{backoff_async, BackoffPolicy};
///
/// # tokio_test::block_on(async {
/// let hits = Arc::new(AtomicU32::new(0));
/// let policy = BackoffPolicy::new().retries(5).threshold(Duration::from_millis(10)).build()?;
/// let mut wrapped = backoff_async(
///     move |step: u32| {
///         let hits = Arc::clone(&hits);
///         async move { hits.fetch_add(step, Ordering::SeqCst) + step }
///     },
///     |total: &u32| *total >= 3,
///     MockSleeper::new(),
///     policy,
/// );
///
/// assert_eq!(wrapped.call(1).await.ok(), Some(3));
/// # Ok::<(), cadence_common::ConfigError>(())
/// # }).unwrap();
/// ```
pub struct Backoff<F, C, S = TokioSleeper> {
    operation: F,
    comparator: C,
    sleeper: S,
    policy: BackoffPolicy,
}

impl<F, C> Backoff<F, C, TokioSleeper> {
    /// Wrap an operation, waiting on the tokio timer between attempts
    pub fn with_tokio_sleeper(operation: F, comparator: C, policy: BackoffPolicy) -> Self {
        Self::new(operation, comparator, TokioSleeper, policy)
    }
}

impl<F, C, S> Backoff<F, C, S> {
    /// Wrap an operation with a comparator, sleeper and policy
    pub fn new(operation: F, comparator: C, sleeper: S, policy: BackoffPolicy) -> Self {
        Self { operation, comparator, sleeper, policy }
    }

    /// The policy governing this wrapper
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }
}

impl<F, C, S: Sleeper> Backoff<F, C, S> {
    /// Run the operation until the comparator accepts its result
    #[instrument(
        skip_all,
        fields(
            retries = self.policy.retries,
            threshold_ms = self.policy.threshold.as_millis() as u64
        )
    )]
    pub async fn call<A, Fut, T>(&mut self, args: A) -> BackoffResult<T>
    where
        A: Clone,
        F: FnMut(A) -> Fut,
        Fut: Future<Output = T>,
        C: Fn(&T) -> bool,
    {
        self.call_with_outcome(args).await.into_result()
    }

    /// Like [`call`](Self::call), returning summary statistics
    pub async fn call_with_outcome<A, Fut, T>(&mut self, args: A) -> BackoffOutcome<T>
    where
        A: Clone,
        F: FnMut(A) -> Fut,
        Fut: Future<Output = T>,
        C: Fn(&T) -> bool,
    {
        let operation = &mut self.operation;
        drive(&self.policy, &self.comparator, &self.sleeper, args, |args| {
            let fut = operation(args);
            async move { Ok::<T, Infallible>(fut.await) }
        })
        .await
    }

    /// Run a fallible operation; an `Err` is returned without retrying
    #[instrument(
        skip_all,
        fields(
            retries = self.policy.retries,
            threshold_ms = self.policy.threshold.as_millis() as u64
        )
    )]
    pub async fn try_call<A, Fut, T, E>(&mut self, args: A) -> BackoffResult<T, E>
    where
        A: Clone,
        F: FnMut(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&T) -> bool,
    {
        self.try_call_with_outcome(args).await.into_result()
    }

    /// Like [`try_call`](Self::try_call), returning summary statistics
    pub async fn try_call_with_outcome<A, Fut, T, E>(&mut self, args: A) -> BackoffOutcome<T, E>
    where
        A: Clone,
        F: FnMut(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&T) -> bool,
    {
        drive(&self.policy, &self.comparator, &self.sleeper, args, &mut self.operation).await
    }
}

async fn drive<A, G, Fut, T, E, C, S>(
    policy: &BackoffPolicy,
    comparator: &C,
    sleeper: &S,
    args: A,
    mut operation: G,
) -> BackoffOutcome<T, E>
where
    A: Clone,
    G: FnMut(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&T) -> bool,
    S: Sleeper + ?Sized,
{
    let mut state = Attempts::new(policy);
    loop {
        state.begin();
        let response = match operation(args.clone()).await {
            Ok(response) => response,
            Err(error) => return state.finish(Err(BackoffError::Operation(error))),
        };

        if comparator(&response) {
            return state.finish(Ok(response));
        }

        let delay = state.reject();
        sleeper.sleep(delay).await;
        if !state.waited(delay) {
            let attempts = state.attempts;
            return state.finish(Err(BackoffError::Exhausted { attempts, last: response }));
        }
    }
}

/// Blocking backoff wrapper around an operation
///
/// Structurally identical to [`Backoff`]; the sleeper blocks the calling
/// thread between attempts.
pub struct BlockingBackoff<F, C, S = ThreadSleeper> {
    operation: F,
    comparator: C,
    sleeper: S,
    policy: BackoffPolicy,
}

impl<F, C> BlockingBackoff<F, C, ThreadSleeper> {
    /// Wrap an operation, parking the thread between attempts
    pub fn with_thread_sleeper(operation: F, comparator: C, policy: BackoffPolicy) -> Self {
        Self::new(operation, comparator, ThreadSleeper, policy)
    }
}

impl<F, C, S> BlockingBackoff<F, C, S> {
    /// Wrap an operation with a comparator, sleeper and policy
    pub fn new(operation: F, comparator: C, sleeper: S, policy: BackoffPolicy) -> Self {
        Self { operation, comparator, sleeper, policy }
    }

    /// The policy governing this wrapper
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }
}

impl<F, C, S: BlockingSleeper> BlockingBackoff<F, C, S> {
    /// Run the operation until the comparator accepts its result
    pub fn call<A, T>(&mut self, args: A) -> BackoffResult<T>
    where
        A: Clone,
        F: FnMut(A) -> T,
        C: Fn(&T) -> bool,
    {
        self.call_with_outcome(args).into_result()
    }

    /// Like [`call`](Self::call), returning summary statistics
    pub fn call_with_outcome<A, T>(&mut self, args: A) -> BackoffOutcome<T>
    where
        A: Clone,
        F: FnMut(A) -> T,
        C: Fn(&T) -> bool,
    {
        let operation = &mut self.operation;
        drive_blocking(&self.policy, &self.comparator, &self.sleeper, args, |args| {
            Ok::<T, Infallible>(operation(args))
        })
    }

    /// Run a fallible operation; an `Err` is returned without retrying
    pub fn try_call<A, T, E>(&mut self, args: A) -> BackoffResult<T, E>
    where
        A: Clone,
        F: FnMut(A) -> Result<T, E>,
        C: Fn(&T) -> bool,
    {
        self.try_call_with_outcome(args).into_result()
    }

    /// Like [`try_call`](Self::try_call), returning summary statistics
    pub fn try_call_with_outcome<A, T, E>(&mut self, args: A) -> BackoffOutcome<T, E>
    where
        A: Clone,
        F: FnMut(A) -> Result<T, E>,
        C: Fn(&T) -> bool,
    {
        drive_blocking(&self.policy, &self.comparator, &self.sleeper, args, &mut self.operation)
    }
}

fn drive_blocking<A, G, T, E, C, S>(
    policy: &BackoffPolicy,
    comparator: &C,
    sleeper: &S,
    args: A,
    mut operation: G,
) -> BackoffOutcome<T, E>
where
    A: Clone,
    G: FnMut(A) -> Result<T, E>,
    C: Fn(&T) -> bool,
    S: BlockingSleeper + ?Sized,
{
    let mut state = Attempts::new(policy);
    loop {
        state.begin();
        let response = match operation(args.clone()) {
            Ok(response) => response,
            Err(error) => return state.finish(Err(BackoffError::Operation(error))),
        };

        if comparator(&response) {
            return state.finish(Ok(response));
        }

        let delay = state.reject();
        sleeper.sleep(delay);
        if !state.waited(delay) {
            let attempts = state.attempts;
            return state.finish(Err(BackoffError::Exhausted { attempts, last: response }));
        }
    }
}

/// Wrap an async operation in a [`Backoff`]
pub fn backoff_async<A, Fut, F, C, S>(
    operation: F,
    comparator: C,
    sleeper: S,
    policy: BackoffPolicy,
) -> Backoff<F, C, S>
where
    F: FnMut(A) -> Fut,
    S: Sleeper,
{
    Backoff::new(operation, comparator, sleeper, policy)
}

/// Wrap a blocking operation in a [`BlockingBackoff`]
pub fn backoff_blocking<A, R, F, C, S>(
    operation: F,
    comparator: C,
    sleeper: S,
    policy: BackoffPolicy,
) -> BlockingBackoff<F, C, S>
where
    F: FnMut(A) -> R,
    S: BlockingSleeper,
{
    BlockingBackoff::new(operation, comparator, sleeper, policy)
}

#[cfg(test)]
mod tests {
    //! Unit tests for the backoff executors
    //!
    //! Tests cover attempt counting (including `retries = 0`), comparator
    //! strictness, exact delay schedules, error propagation, and receiver
    //! forwarding.

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::backoff::total_backoff;
    use crate::testing::MockSleeper;

    fn policy(retries: u32, threshold_ms: u64) -> BackoffPolicy {
        BackoffPolicy::new()
            .retries(retries)
            .threshold(Duration::from_millis(threshold_ms))
            .build()
            .expect("valid test policy")
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// Tests that an accepted first result never touches the sleeper.
    #[tokio::test]
    async fn test_accepted_first_attempt_never_sleeps() {
        let sleeper = MockSleeper::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut wrapped = Backoff::new(
            move |_: ()| {
                let c = Arc::clone(&counter_clone);
                async move { c.fetch_add(1, Ordering::SeqCst) }
            },
            |_: &u32| true,
            sleeper.clone(),
            policy(3, 50),
        );

        let result = wrapped.call(()).await;
        assert_eq!(result.ok(), Some(0));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(sleeper.calls(), 0, "no delay after an accepted result");
    }

    /// Tests that a never-satisfied comparator yields exactly `retries`
    /// attempts and `retries` delays.
    #[tokio::test]
    async fn test_rejecting_comparator_exhausts_attempts() {
        let sleeper = MockSleeper::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut wrapped = Backoff::new(
            move |_: ()| {
                let c = Arc::clone(&counter_clone);
                async move { c.fetch_add(1, Ordering::SeqCst) + 1 }
            },
            |_: &u32| false,
            sleeper.clone(),
            policy(4, 50),
        );

        match wrapped.call(()).await {
            Err(BackoffError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 4);
                assert_eq!(last, 4, "last rejected result is returned");
            }
            other => panic!("Expected Exhausted error, got {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        assert_eq!(sleeper.delays(), vec![ms(50), ms(100), ms(200), ms(400)]);
        assert_eq!(sleeper.elapsed(), total_backoff(ms(50), 4, 0));
    }

    /// `retries = 0` still performs exactly one attempt.
    #[tokio::test]
    async fn test_zero_retries_runs_exactly_once() {
        let sleeper = MockSleeper::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut wrapped = Backoff::new(
            move |_: ()| {
                let c = Arc::clone(&counter_clone);
                async move { c.fetch_add(1, Ordering::SeqCst) }
            },
            |_: &u32| false,
            sleeper.clone(),
            policy(0, 50),
        );

        let err = wrapped.call(()).await.unwrap_err();
        assert_eq!(err.attempts(), Some(1));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(sleeper.delays(), vec![ms(50)]);
    }

    /// Tests success after two rejected results.
    #[tokio::test]
    async fn test_accepts_after_rejections() {
        let sleeper = MockSleeper::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut wrapped = Backoff::new(
            move |_: ()| {
                let c = Arc::clone(&counter_clone);
                async move { c.fetch_add(1, Ordering::SeqCst) + 1 }
            },
            |n: &u32| *n == 3,
            sleeper.clone(),
            policy(5, 100),
        );

        let outcome = wrapped.call_with_outcome(()).await;
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.delays, vec![ms(100), ms(200)]);
        assert_eq!(outcome.total_delay, ms(300));
        assert_eq!(outcome.average_delay(), ms(150));
        assert_eq!(outcome.into_result().ok(), Some(3));
    }

    /// Each call builds fresh counters.
    #[tokio::test]
    async fn test_calls_are_independent() {
        let sleeper = MockSleeper::new();
        let mut wrapped = Backoff::new(
            |_: ()| async { 0_u8 },
            |_: &u8| false,
            sleeper.clone(),
            policy(2, 10),
        );

        assert_eq!(wrapped.call(()).await.unwrap_err().attempts(), Some(2));
        assert_eq!(wrapped.call(()).await.unwrap_err().attempts(), Some(2));
        assert_eq!(sleeper.delays(), vec![ms(10), ms(20), ms(10), ms(20)]);
    }

    /// Operation errors propagate immediately and are not retried.
    #[tokio::test]
    async fn test_operation_error_is_not_retried() {
        let sleeper = MockSleeper::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut wrapped = Backoff::new(
            move |_: ()| {
                let c = Arc::clone(&counter_clone);
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        Ok(0_u32)
                    } else {
                        Err("connection reset")
                    }
                }
            },
            |_: &u32| false,
            sleeper.clone(),
            policy(5, 10),
        );

        let result = wrapped.try_call(()).await;
        assert!(matches!(result, Err(BackoffError::Operation("connection reset"))));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(
            sleeper.delays(),
            vec![ms(10)],
            "only the rejected result is followed by a delay"
        );
    }

    /// Arguments are forwarded on every attempt and can carry the receiver.
    #[tokio::test]
    async fn test_forwards_receiver_and_arguments() {
        struct Service {
            name: &'static str,
            hits: AtomicU32,
        }

        impl Service {
            async fn probe(&self, suffix: &str) -> String {
                let hit = self.hits.fetch_add(1, Ordering::SeqCst);
                format!("{}-{}-{}", self.name, suffix, hit)
            }
        }

        let service = Arc::new(Service { name: "primary", hits: AtomicU32::new(0) });
        let mut wrapped = Backoff::new(
            |(svc, suffix): (Arc<Service>, &'static str)| async move { svc.probe(suffix).await },
            |reply: &String| reply.ends_with("-1"),
            MockSleeper::new(),
            policy(3, 1),
        );

        let reply = wrapped.call((Arc::clone(&service), "eu")).await;
        assert_eq!(reply.ok().as_deref(), Some("primary-eu-1"));
        assert_eq!(service.hits.load(Ordering::SeqCst), 2);
    }

    /// The capped policy limits each recorded delay.
    #[tokio::test]
    async fn test_max_delay_caps_schedule() {
        let sleeper = MockSleeper::new();
        let capped = BackoffPolicy::new()
            .retries(5)
            .threshold(ms(100))
            .max_delay(ms(250))
            .build()
            .unwrap();

        let mut wrapped = Backoff::new(|_: ()| async {}, |_: &()| false, sleeper.clone(), capped);
        let _ = wrapped.call(()).await;

        assert_eq!(sleeper.delays(), vec![ms(100), ms(200), ms(250), ms(250), ms(250)]);
    }

    /// Blocking flavour mirrors the async one.
    #[test]
    fn test_blocking_exhausts_with_schedule() {
        let sleeper = MockSleeper::new();
        let mut calls = 0_u32;

        let outcome = {
            let mut wrapped = BlockingBackoff::new(
                |_: ()| {
                    calls += 1;
                    calls
                },
                |n: &u32| *n > 10,
                sleeper.clone(),
                policy(3, 100),
            );
            wrapped.call_with_outcome(())
        };

        assert_eq!(calls, 3);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.total_delay, ms(700));
        assert_eq!(sleeper.delays(), vec![ms(100), ms(200), ms(400)]);
        assert_eq!(outcome.into_result().unwrap_err().into_last(), Some(3));
    }

    #[test]
    fn test_blocking_zero_retries_runs_exactly_once() {
        let sleeper = MockSleeper::new();
        let mut wrapped =
            BlockingBackoff::new(|_: ()| "nope", |_: &&str| false, sleeper.clone(), policy(0, 5));

        let err = wrapped.call(()).unwrap_err();
        assert_eq!(err.attempts(), Some(1));
        assert_eq!(sleeper.calls(), 1);
    }

    #[test]
    fn test_blocking_try_call_propagates_error() {
        let sleeper = MockSleeper::new();
        let mut wrapped = BlockingBackoff::new(
            |n: i32| if n < 0 { Err(format!("negative input {n}")) } else { Ok(n) },
            |_: &i32| true,
            sleeper.clone(),
            policy(3, 5),
        );

        assert_eq!(wrapped.try_call(4).ok(), Some(4));
        let err = wrapped.try_call(-2).unwrap_err();
        assert!(err.to_string().contains("negative input -2"));
        assert_eq!(sleeper.calls(), 0);
    }

    /// Validates error display and classification.
    ///
    /// Assertions:
    /// - Exhausted mentions the attempt count and is a retryable warning.
    /// - Operation wraps the inner message and is a non-retryable error.
    #[test]
    fn test_backoff_error_display_and_classification() {
        let err = BackoffError::<u32, String>::Exhausted { attempts: 5, last: 0 };
        assert!(err.to_string().contains("5 attempts"));
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = BackoffError::<u32, String>::Operation("boom".to_string());
        assert_eq!(err.to_string(), "Operation failed: boom");
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.attempts(), None);
        assert_eq!(err.into_last(), None);
    }

    #[test]
    fn test_outcome_average_delay_without_delays() {
        let outcome: BackoffOutcome<u8> = BackoffOutcome {
            result: Ok(1),
            attempts: 1,
            delays: Vec::new(),
            total_delay: Duration::ZERO,
        };
        assert_eq!(outcome.average_delay(), Duration::ZERO);
    }

    #[test]
    fn test_free_constructors() {
        let wrapped = backoff_blocking(|n: u8| n, |_: &u8| true, MockSleeper::new(), policy(7, 1));
        assert_eq!(wrapped.policy().retries, 7);

        let wrapped = backoff_async(
            |n: u8| async move { n },
            |_: &u8| true,
            MockSleeper::new(),
            policy(2, 1),
        );
        assert_eq!(wrapped.policy().retries, 2);
    }
}
