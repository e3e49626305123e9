//! Backoff policy and delay arithmetic
//!
//! The delay before the Nth retry is `2^N * threshold`, with `N` starting at
//! 0 for the delay that follows the first rejected attempt. Cumulative waits
//! are the geometric series exposed by [`total_backoff`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::utils::serde::{duration_millis, option_duration_millis};

/// Default number of retries
pub const DEFAULT_RETRIES: u32 = 3;

/// Default base delay unit
pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(50);

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_threshold() -> Duration {
    DEFAULT_THRESHOLD
}

/// `2^exponent * threshold`, saturating at `Duration::MAX`.
fn scaled(threshold: Duration, exponent: u32) -> Duration {
    if threshold.is_zero() {
        return Duration::ZERO;
    }
    2u32.checked_pow(exponent)
        .and_then(|factor| threshold.checked_mul(factor))
        .unwrap_or(Duration::MAX)
}

/// Cumulative delay issued by `calls` consecutive waits, starting at
/// exponent `start`.
///
/// Computes `Σ_{i=0}^{calls-1} 2^(i+start) * threshold`, saturating at
/// `Duration::MAX`.
///
/// ```rust
/// use std::time::Duration;
///
/// use cadence_common::total_backoff;
///
/// let ms = Duration::from_millis;
/// assert_eq!(total_backoff(ms(100), 5, 0), ms(3_100));
/// assert_eq!(total_backoff(ms(100), 5, 3), ms(24_800));
/// assert_eq!(total_backoff(ms(100), 0, 0), Duration::ZERO);
/// ```
pub fn total_backoff(threshold: Duration, calls: u32, start: u32) -> Duration {
    let mut total = Duration::ZERO;
    for i in 0..calls {
        let exponent = start.saturating_add(i);
        total = total.saturating_add(scaled(threshold, exponent));
        if total == Duration::MAX {
            break;
        }
    }
    total
}

/// Retry count and delay schedule for a backoff executor
///
/// On disk the durations are written in milliseconds:
///
/// ```toml
/// retries = 5
/// threshold_ms = 100
/// max_delay_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackoffPolicy {
    /// Number of attempts to make; `0` still runs the operation once
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base delay unit, doubled after every rejected attempt
    #[serde(rename = "threshold_ms", default = "default_threshold", with = "duration_millis")]
    pub threshold: Duration,

    /// Optional cap applied to each individual delay
    #[serde(
        rename = "max_delay_ms",
        default,
        with = "option_duration_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_delay: Option<Duration>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { retries: DEFAULT_RETRIES, threshold: DEFAULT_THRESHOLD, max_delay: None }
    }
}

impl BackoffPolicy {
    /// Start building a policy from the defaults
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> BackoffPolicyBuilder {
        BackoffPolicyBuilder::new()
    }

    /// Create a configuration builder (alias for `new()`)
    pub fn builder() -> BackoffPolicyBuilder {
        BackoffPolicyBuilder::new()
    }

    /// Validate the policy
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(max_delay) = self.max_delay {
            if max_delay < self.threshold {
                return Err(ConfigError::invalid(format!(
                    "max_delay ({max_delay:?}) must not be smaller than threshold ({:?})",
                    self.threshold
                )));
            }
        }
        Ok(())
    }

    /// Number of times the operation runs when every result is rejected.
    ///
    /// The first attempt always runs, so `retries = 0` still yields one.
    pub fn attempts(&self) -> u32 {
        self.retries.max(1)
    }

    /// Delay issued after the rejected attempt with the given 0-based
    /// exponent, capped by `max_delay` when set.
    pub fn delay_for(&self, exponent: u32) -> Duration {
        let delay = scaled(self.threshold, exponent);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Cumulative delay of the first `calls` waits under this policy.
    ///
    /// Equals [`total_backoff`] with `start = 0` when no cap is configured.
    pub fn total_delay(&self, calls: u32) -> Duration {
        match self.max_delay {
            None => total_backoff(self.threshold, calls, 0),
            Some(_) => (0..calls)
                .map(|exponent| self.delay_for(exponent))
                .fold(Duration::ZERO, Duration::saturating_add),
        }
    }

    /// Load and validate a policy from TOML
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let policy: Self = toml::from_str(source)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load and validate a policy from JSON
    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        let policy: Self = serde_json::from_str(source)?;
        policy.validate()?;
        Ok(policy)
    }
}

/// Builder for BackoffPolicy with fluent API
#[derive(Debug)]
pub struct BackoffPolicyBuilder {
    policy: BackoffPolicy,
}

impl Default for BackoffPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BackoffPolicyBuilder {
    pub fn new() -> Self {
        Self { policy: BackoffPolicy::default() }
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.policy.retries = retries;
        self
    }

    pub fn threshold(mut self, threshold: Duration) -> Self {
        self.policy.threshold = threshold;
        self
    }

    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.policy.max_delay = Some(max_delay);
        self
    }

    pub fn uncapped(mut self) -> Self {
        self.policy.max_delay = None;
        self
    }

    pub fn build(self) -> ConfigResult<BackoffPolicy> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}
