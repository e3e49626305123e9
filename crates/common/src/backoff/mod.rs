//! Exponential backoff around a result comparator
//!
//! A backoff wrapper re-runs an operation until a comparator accepts the
//! result, doubling the wait between attempts:
//!
//! - **[`policy`]**: [`BackoffPolicy`] (retry count, base threshold, optional
//!   cap) and the [`total_backoff`] series
//! - **[`executor`]**: [`Backoff`] for async operations and
//!   [`BlockingBackoff`] for blocking ones (runtime tier)
//!
//! Giving up is explicit: an exhausted call returns
//! [`BackoffError::Exhausted`] carrying the last rejected result, so a
//! legitimately empty success can never be confused with a failure.

pub mod policy;

#[cfg(feature = "runtime")]
pub mod executor;

#[cfg(feature = "runtime")]
pub use executor::{
    backoff_async, backoff_blocking, Backoff, BackoffError, BackoffOutcome, BackoffResult,
    BlockingBackoff,
};
pub use policy::{
    total_backoff, BackoffPolicy, BackoffPolicyBuilder, DEFAULT_RETRIES, DEFAULT_THRESHOLD,
};
