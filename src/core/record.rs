//! Log record structure

use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Last timestamp handed out, in microseconds since the epoch
static LAST_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current UTC time truncated to microseconds, never earlier than a
/// previously returned value in this process.
fn monotonic_now() -> DateTime<Utc> {
    let now = Utc::now().timestamp_micros();
    let prev = LAST_MICROS.fetch_max(now, Ordering::AcqRel);
    let micros = now.max(prev);
    DateTime::from_timestamp_micros(micros).unwrap_or_else(Utc::now)
}

/// One log event. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    timestamp: DateTime<Utc>,
    level: LogLevel,
    message: String,
    context: LogContext,
}

impl Record {
    pub fn new(level: LogLevel, message: impl Into<String>, context: LogContext) -> Self {
        Self {
            timestamp: monotonic_now(),
            level,
            message: message.into(),
            context,
        }
    }

    /// Build a record with an explicit timestamp
    pub fn with_timestamp(
        timestamp: DateTime<Utc>,
        level: LogLevel,
        message: impl Into<String>,
        context: LogContext,
    ) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
            context,
        }
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }
}
