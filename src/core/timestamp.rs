//! Timestamp formatting for encoded records
//!
//! Both formats keep microsecond precision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp representation in the `timestamp` key of each JSON line
///
/// # Examples
///
/// ```
/// use log_emitter::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let dt = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(
///     TimestampFormat::Iso8601Micros.format(&dt),
///     "2025-01-08T10:30:45.000000Z"
/// );
/// assert_eq!(TimestampFormat::UnixMicros.format(&dt), "1736332245000000");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`, as a JSON string
    #[default]
    Iso8601Micros,

    /// Unix timestamp in microseconds: `1736332245123456`, as a JSON number
    UnixMicros,
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601Micros => {
                datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
            }
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
        }
    }

    /// JSON value for this format: a string for ISO 8601, a number for Unix
    #[must_use]
    pub fn to_json(&self, datetime: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimestampFormat::Iso8601Micros => serde_json::Value::String(self.format(datetime)),
            TimestampFormat::UnixMicros => serde_json::Value::from(datetime.timestamp_micros()),
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::UnixMicros)
    }
}
