//! Repeating a callback on a fixed cadence
//!
//! [`IntervalScheduler`] invokes a callback immediately (after an optional
//! initial delay), then again every `interval`, until the configured number
//! of repetitions is used up or a stop predicate accepts the latest result.
//! The run resolves with the last produced result.
//!
//! Cancellation is cooperative through a [`CancellationToken`]: once it is
//! cancelled no further invocation starts, a pending wait is abandoned, and
//! the run resolves with [`IntervalError::Cancelled`].

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, instrument};

use super::sleeper::{Sleeper, TokioSleeper};
use crate::error::{ConfigResult, ErrorClassification, ErrorSeverity};
use crate::utils::serde::{duration_millis, option_duration_millis};

/// Default cadence between invocations
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(4);

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

/// Errors that end an interval run early
#[derive(Debug, Error)]
pub enum IntervalError<E = Infallible> {
    /// The cancellation token fired before the run finished
    #[error("Interval cancelled after {completed} invocations")]
    Cancelled {
        /// Invocations that finished before cancellation
        completed: u32,
    },

    /// The callback failed; the run stops without retrying
    #[error("Interval callback failed: {0}")]
    Callback(E),

    /// A spawned run panicked or was aborted
    #[error("Interval task failed to complete: {message}")]
    Join {
        /// The join error's description
        message: String,
    },
}

impl<E> ErrorClassification for IntervalError<E> {
    fn is_retryable(&self) -> bool {
        false
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled { .. } => ErrorSeverity::Info,
            Self::Callback(_) => ErrorSeverity::Error,
            Self::Join { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Join { .. })
    }
}

/// Result type for interval runs
pub type IntervalResult<T, E = Infallible> = Result<T, IntervalError<E>>;

/// How many times a callback runs
///
/// Serialized as an integer count or the string `"forever"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RepeatRepr", into = "RepeatRepr")]
pub enum Repeat {
    /// A fixed number of invocations; `Times(0)` is a no-op
    Times(u32),
    /// Repeat until the stop predicate matches or the run is cancelled
    Forever,
}

impl Default for Repeat {
    fn default() -> Self {
        Self::Times(1)
    }
}

impl From<u32> for Repeat {
    fn from(times: u32) -> Self {
        Self::Times(times)
    }
}

impl Repeat {
    /// Whether no invocations remain
    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::Times(0))
    }

    fn decrement(self) -> Self {
        match self {
            Self::Times(n) => Self::Times(n.saturating_sub(1)),
            Self::Forever => Self::Forever,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RepeatKeyword {
    Forever,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RepeatRepr {
    Count(u32),
    Keyword(RepeatKeyword),
}

impl From<RepeatRepr> for Repeat {
    fn from(repr: RepeatRepr) -> Self {
        match repr {
            RepeatRepr::Count(n) => Self::Times(n),
            RepeatRepr::Keyword(RepeatKeyword::Forever) => Self::Forever,
        }
    }
}

impl From<Repeat> for RepeatRepr {
    fn from(repeat: Repeat) -> Self {
        match repeat {
            Repeat::Times(n) => Self::Count(n),
            Repeat::Forever => Self::Keyword(RepeatKeyword::Forever),
        }
    }
}

/// Configuration for an interval run
///
/// ```toml
/// interval_ms = 250
/// times = "forever"
/// delay_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntervalConfig {
    /// Wait between consecutive invocations
    #[serde(rename = "interval_ms", default = "default_interval", with = "duration_millis")]
    pub interval: Duration,

    /// Number of invocations
    #[serde(default)]
    pub times: Repeat,

    /// Optional wait before the first invocation
    #[serde(
        rename = "delay_ms",
        default,
        with = "option_duration_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub delay: Option<Duration>,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl IntervalConfig {
    /// Create a single-invocation configuration with the given cadence
    pub fn new(interval: Duration) -> Self {
        Self { interval, times: Repeat::default(), delay: None }
    }

    /// Set the number of invocations
    pub fn times(mut self, times: u32) -> Self {
        self.times = Repeat::Times(times);
        self
    }

    /// Repeat until stopped
    pub fn forever(mut self) -> Self {
        self.times = Repeat::Forever;
        self
    }

    /// Wait before the first invocation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Load a configuration from TOML
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a configuration from JSON
    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Handle for cancelling an interval run from elsewhere
#[derive(Debug, Clone)]
pub struct IntervalHandle {
    token: CancellationToken,
}

impl IntervalHandle {
    /// Stop the run; no further invocation starts
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if the run has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The underlying token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// A run started with [`IntervalScheduler::spawn`]
///
/// Dropping the task cancels the run. Call [`join`](Self::join) to let it
/// finish.
#[derive(Debug)]
pub struct IntervalTask<T> {
    handle: IntervalHandle,
    join: JoinHandle<IntervalResult<Option<T>>>,
    guard: DropGuard,
}

impl<T> IntervalTask<T> {
    /// Get a handle to cancel the run
    pub fn handle(&self) -> IntervalHandle {
        self.handle.clone()
    }

    /// Cancel the run
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// Whether the background task has finished
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the run to resolve
    pub async fn join(self) -> IntervalResult<Option<T>> {
        let Self { join, guard, .. } = self;
        let result = join.await;
        drop(guard.disarm());
        match result {
            Ok(result) => result,
            Err(err) => Err(IntervalError::Join { message: err.to_string() }),
        }
    }
}

/// Repeats a callback according to an [`IntervalConfig`]
///
/// ```rust
/// use std::time::Duration;
///
/// use cadence_common::{IntervalConfig, IntervalScheduler};
///
/// # tokio_test::block_on(async {
/// let mut polls = 0_u32;
/// let scheduler = IntervalScheduler::new(IntervalConfig::new(Duration::from_millis(1)).forever());
/// let last = scheduler
///     .run_until(
///         || {
///             polls += 1;
///             std::future::ready(polls)
///         },
///         |n| *n > 1,
///     )
///     .await;
///
/// assert_eq!(last.ok().flatten(), Some(2));
/// # });
/// ```
#[derive(Debug)]
pub struct IntervalScheduler<S = TokioSleeper> {
    config: IntervalConfig,
    sleeper: S,
    cancellation: CancellationToken,
}

impl IntervalScheduler<TokioSleeper> {
    /// Create a scheduler that waits on the tokio timer
    pub fn new(config: IntervalConfig) -> Self {
        Self { config, sleeper: TokioSleeper, cancellation: CancellationToken::new() }
    }
}

impl<S> IntervalScheduler<S> {
    /// Replace the delay primitive
    pub fn with_sleeper<S2>(self, sleeper: S2) -> IntervalScheduler<S2> {
        IntervalScheduler { config: self.config, sleeper, cancellation: self.cancellation }
    }

    /// Observe a caller-owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The configuration driving this scheduler
    pub fn config(&self) -> &IntervalConfig {
        &self.config
    }

    /// Get a handle that cancels runs of this scheduler
    pub fn handle(&self) -> IntervalHandle {
        IntervalHandle { token: self.cancellation.clone() }
    }

    fn cancelled<E>(&self, completed: u32) -> IntervalError<E> {
        info!("Interval cancelled after {} invocations", completed);
        IntervalError::Cancelled { completed }
    }
}

impl<S: Sleeper> IntervalScheduler<S> {
    /// Invoke the callback for every configured repetition
    pub async fn run<F, Fut, T>(&self, callback: F) -> IntervalResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
    {
        self.run_until(callback, |_| false).await
    }

    /// Invoke the callback until `stop_if` accepts a result or the
    /// repetitions run out
    ///
    /// Resolves with `None` only when zero repetitions are configured.
    pub async fn run_until<F, Fut, T, P>(
        &self,
        mut callback: F,
        stop_if: P,
    ) -> IntervalResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
        P: Fn(&T) -> bool,
    {
        self.try_run_until(
            || {
                let fut = callback();
                async move { Ok::<T, Infallible>(fut.await) }
            },
            stop_if,
        )
        .await
    }

    /// Like [`run_until`](Self::run_until) for a fallible callback; an `Err`
    /// ends the run as [`IntervalError::Callback`]
    #[instrument(
        skip_all,
        fields(interval_ms = self.config.interval.as_millis() as u64, times = ?self.config.times)
    )]
    pub async fn try_run_until<F, Fut, T, E, P>(
        &self,
        mut callback: F,
        stop_if: P,
    ) -> IntervalResult<Option<T>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&T) -> bool,
    {
        let mut remaining = self.config.times;
        if remaining.is_exhausted() {
            debug!("No repetitions requested");
            return Ok(None);
        }

        let mut completed = 0_u32;
        if let Some(delay) = self.config.delay {
            if !self.pause(delay).await {
                return Err(self.cancelled(completed));
            }
        }

        loop {
            if self.cancellation.is_cancelled() {
                return Err(self.cancelled(completed));
            }

            debug!("Invoking interval callback (invocation {})", completed + 1);
            let result = callback().await.map_err(IntervalError::Callback)?;
            completed = completed.saturating_add(1);

            if stop_if(&result) {
                debug!("Stop condition met after {} invocations", completed);
                return Ok(Some(result));
            }

            remaining = remaining.decrement();
            if remaining.is_exhausted() {
                return Ok(Some(result));
            }

            if !self.pause(self.config.interval).await {
                return Err(self.cancelled(completed));
            }
        }
    }

    /// Follow the schedule of [`run`](Self::run) with a no-op callback
    ///
    /// Waits the initial delay, then one interval between consecutive
    /// steps: `delay + (times - 1) * interval`. A `Forever` schedule waits
    /// until cancelled.
    pub async fn wait(&self) -> IntervalResult<()> {
        let mut remaining = self.config.times;
        if remaining.is_exhausted() {
            return Ok(());
        }

        let mut completed = 0_u32;
        if let Some(delay) = self.config.delay {
            if !self.pause(delay).await {
                return Err(self.cancelled(completed));
            }
        }

        loop {
            completed = completed.saturating_add(1);
            remaining = remaining.decrement();
            if remaining.is_exhausted() {
                return Ok(());
            }
            if !self.pause(self.config.interval).await {
                return Err(self.cancelled(completed));
            }
        }
    }

    /// Sleep for `delay`; returns `false` if cancelled first
    async fn pause(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => false,
            () = self.sleeper.sleep(delay) => true,
        }
    }
}

impl<S: Sleeper + 'static> IntervalScheduler<S> {
    /// Run [`run_until`](Self::run_until) on a background task
    ///
    /// The run observes a child of this scheduler's token. Cancelling the
    /// scheduler stops it, while cancelling or dropping the returned task
    /// stops only this run.
    pub fn spawn<F, Fut, T, P>(self, callback: F, stop_if: P) -> IntervalTask<T>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        P: Fn(&T) -> bool + Send + 'static,
    {
        let token = self.cancellation.child_token();
        let guard = token.clone().drop_guard();
        let scheduler = self.with_cancellation(token);
        let handle = scheduler.handle();
        let join = tokio::spawn(async move { scheduler.run_until(callback, stop_if).await });
        IntervalTask { handle, join, guard }
    }
}
