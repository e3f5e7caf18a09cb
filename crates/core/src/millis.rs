//! Serde helpers for durations expressed as whole milliseconds
//!
//! Hook descriptors, tier tables and reports all speak milliseconds on the
//! wire, while the code works with [`Duration`].

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Convert a duration to whole milliseconds, saturating at `u64::MAX`
#[must_use]
pub fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Serialize a [`Duration`] as milliseconds
pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(as_millis(*duration))
}

/// Deserialize milliseconds into a [`Duration`]
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
