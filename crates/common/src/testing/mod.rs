//! Testing utilities
//!
//! - **[`sleeper`]**: [`MockSleeper`], a delay primitive that records instead
//!   of waiting

pub mod sleeper;

pub use sleeper::MockSleeper;
