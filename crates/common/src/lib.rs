//! Backoff and interval scheduling primitives.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: errors, backoff policies, total-backoff math, serde helpers
//! - `runtime`: async and blocking executors, the interval scheduler, sleepers
//!   and testing helpers (enabled by default)
//! - `observability`: tracing instrumentation (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod backoff;
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use backoff::{
    backoff_async, backoff_blocking, Backoff, BackoffError, BackoffOutcome, BackoffResult,
    BlockingBackoff,
};
#[cfg(feature = "foundation")]
pub use backoff::{total_backoff, BackoffPolicy, BackoffPolicyBuilder};
#[cfg(feature = "foundation")]
pub use error::{ConfigError, ConfigResult, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use time::{
    BlockingSleeper, IntervalConfig, IntervalError, IntervalHandle, IntervalResult,
    IntervalScheduler, IntervalTask, Repeat, Sleeper, ThreadSleeper, TokioSleeper,
};
#[cfg(feature = "foundation")]
pub use utils::serde::duration_millis;
