//! Common utility helpers
//!
//! - **[`serde`]**: Serialization helpers for millisecond durations

pub mod serde;

// Re-export commonly used items for convenience
pub use self::serde::{duration_millis, option_duration_millis};
