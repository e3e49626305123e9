//! Serde helpers for millisecond-denominated durations
//!
//! Policies and interval configs are written in milliseconds on disk
//! (`threshold_ms = 50`, `interval_ms = 4`), while the in-memory types use
//! [`Duration`].

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serde result type shared by the serializers below
type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

fn millis_of(duration: &Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// (De)serialize a `Duration` as whole milliseconds (u64)
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use cadence_common::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     threshold: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::*;

    /// Serialize a Duration as milliseconds, saturating at `u64::MAX`
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_u64(millis_of(duration))
    }

    /// Deserialize milliseconds (u64) into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// (De)serialize an `Option<Duration>` as optional milliseconds
///
/// Pair with `#[serde(default)]` so a missing key reads as `None`.
pub mod option_duration_millis {
    use super::*;

    /// Serialize `Some(duration)` as milliseconds and `None` as a unit/none
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => serializer.serialize_some(&millis_of(duration)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize optional milliseconds into an `Option<Duration>`
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
