//! Recording sleeper for deterministic tests
//!
//! [`MockSleeper`] implements both [`Sleeper`] and [`BlockingSleeper`]
//! without waiting. Every requested delay is recorded and added to a
//! simulated elapsed time, so tests can assert the exact backoff schedule.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use cadence_common::testing::MockSleeper;
//! use cadence_common::{BackoffPolicy, BlockingBackoff};
//!
//! let sleeper = MockSleeper::new();
//! let policy = BackoffPolicy::new()
//!     .retries(3)
//!     .threshold(Duration::from_millis(10))
//!     .build()
//!     .unwrap();
//! let mut wrapped =
//!     BlockingBackoff::new(|_: ()| 0_u32, |n: &u32| *n > 0, sleeper.clone(), policy);
//!
//! assert!(wrapped.call(()).is_err());
//! assert_eq!(sleeper.elapsed(), Duration::from_millis(70));
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::time::{BlockingSleeper, Sleeper};

#[derive(Debug, Default)]
struct SleepLog {
    delays: Vec<Duration>,
    elapsed: Duration,
}

/// Sleeper that records delays instead of waiting
///
/// Clones share the same log, so a test can keep one copy and hand another
/// to the executor under test.
#[derive(Debug, Clone, Default)]
pub struct MockSleeper {
    log: Arc<Mutex<SleepLog>>,
}

impl MockSleeper {
    /// Create a sleeper with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in order
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        self.log.lock().delays.clone()
    }

    /// Number of sleeps requested so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.log.lock().delays.len()
    }

    /// Simulated time spent sleeping
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.log.lock().elapsed
    }

    /// Clear the log
    pub fn reset(&self) {
        let mut log = self.log.lock();
        log.delays.clear();
        log.elapsed = Duration::ZERO;
    }

    fn record(&self, delay: Duration) {
        let mut log = self.log.lock();
        log.delays.push(delay);
        log.elapsed = log.elapsed.saturating_add(delay);
    }
}

#[async_trait]
impl Sleeper for MockSleeper {
    async fn sleep(&self, delay: Duration) {
        self.record(delay);
        // Give other tasks (and cancellation) a chance to run.
        tokio::task::yield_now().await;
    }
}

impl BlockingSleeper for MockSleeper {
    fn sleep(&self, delay: Duration) {
        self.record(delay);
    }
}
