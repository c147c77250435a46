use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// One observation of the monitored target.
///
/// Serializes to the wire shape served by the query API:
/// `{"timestamp": "<RFC3339>", "online": bool, "latency": ms}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    /// Instant the check was initiated
    #[serde(serialize_with = "serialize_rfc3339")]
    pub timestamp: DateTime<Utc>,

    /// Whether the probe was classified successful
    pub online: bool,

    /// Probe duration in milliseconds, `0` if no response was received
    #[serde(rename = "latency")]
    pub latency_ms: u64,
}

impl StatusRecord {
    pub fn new(timestamp: DateTime<Utc>, online: bool, latency_ms: u64) -> Self {
        Self { timestamp, online, latency_ms }
    }

    /// Timestamp as stored in the `status` table (unix milliseconds)
    pub fn timestamp_to_i64(time: DateTime<Utc>) -> i64 {
        time.timestamp_millis()
    }

    /// Inverse of [`StatusRecord::timestamp_to_i64`], `None` when out of range
    pub fn i64_to_timestamp(millis: i64) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(millis)
    }
}

fn serialize_rfc3339<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}
