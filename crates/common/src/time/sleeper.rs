//! Delay primitives used between attempts and intervals
//!
//! Executors never call `tokio::time::sleep` or `std::thread::sleep`
//! directly; they go through [`Sleeper`] (async) or [`BlockingSleeper`]
//! (blocking) so tests can substitute [`crate::testing::MockSleeper`] and
//! observe the exact delays requested.

use std::time::Duration;

use async_trait::async_trait;

/// Asynchronous delay primitive
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the current task for `delay`
    async fn sleep(&self, delay: Duration);
}

/// Blocking delay primitive for synchronous executors
pub trait BlockingSleeper: Send + Sync {
    /// Block the current thread for `delay`
    fn sleep(&self, delay: Duration);
}

/// [`Sleeper`] backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// [`BlockingSleeper`] that parks the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl BlockingSleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
