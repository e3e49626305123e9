//! Time utilities for scheduling and waiting
//!
//! - **[`sleeper`]**: [`Sleeper`] and [`BlockingSleeper`], the delay
//!   primitives every executor waits through
//! - **[`interval`]**: [`IntervalScheduler`], repeat a callback on a fixed
//!   cadence with an optional initial delay and stop predicate
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use cadence_common::time::{IntervalConfig, IntervalScheduler};
//!
//! # tokio_test::block_on(async {
//! let scheduler = IntervalScheduler::new(IntervalConfig::new(Duration::from_millis(1)).times(3));
//! let mut ticks = 0_u32;
//! let last = scheduler
//!     .run(|| {
//!         ticks += 1;
//!         std::future::ready(ticks)
//!     })
//!     .await;
//!
//! assert_eq!(last.ok().flatten(), Some(3));
//! # });
//! ```

pub mod interval;
pub mod sleeper;

pub use interval::{
    IntervalConfig, IntervalError, IntervalHandle, IntervalResult, IntervalScheduler, IntervalTask,
    Repeat, DEFAULT_INTERVAL,
};
pub use sleeper::{BlockingSleeper, Sleeper, ThreadSleeper, TokioSleeper};
