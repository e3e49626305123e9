//! Shared error classification for cadence primitives
//!
//! Each module owns a concrete error enum (`ConfigError` here,
//! `BackoffError` in [`crate::backoff`], `IntervalError` in [`crate::time`]).
//! They all implement [`ErrorClassification`] so callers can make uniform
//! decisions about logging and escalation without matching on every variant.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected, caller-driven conditions | Interval cancelled by its owner |
//! | **Warning** | Degraded but operational | Backoff gave up after all attempts |
//! | **Error** | Failure requiring attention | Invalid policy, operation error |
//! | **Critical** | System integrity at risk | (unused by this crate) |

use std::fmt;

use thiserror::Error;

/// Errors raised while building or loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value was structurally valid but violates a constraint
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// The configuration source could not be parsed
    #[error("Failed to parse {format} configuration: {message}")]
    Parse { format: &'static str, message: String },
}

impl ConfigError {
    /// Create an invalid-value error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid { message: message.into() }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse { format: "JSON", message: err.to_string() }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse { format: "TOML", message: err.to_string() }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ErrorClassification for ConfigError {
    fn is_retryable(&self) -> bool {
        false
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    fn is_critical(&self) -> bool {
        false
    }
}

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: running the same work again may
    /// produce a different outcome.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for monitoring, alerting, and logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
