//! Log level definitions
//!
//! The eight syslog severities (RFC 5424). The discriminant is the numeric
//! severity, so a lower number is more severe.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    #[default]
    Info = 6,
    Debug = 7,
}

impl LogLevel {
    /// All levels, most severe first
    pub const ALL: [LogLevel; 8] = [
        LogLevel::Emergency,
        LogLevel::Alert,
        LogLevel::Critical,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Notice,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    /// Stable name used in encoded output
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Emergency => "EMERGENCY",
            LogLevel::Alert => "ALERT",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Notice => "NOTICE",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Numeric syslog severity (0 = Emergency, 7 = Debug)
    #[inline]
    pub fn severity(&self) -> u8 {
        *self as u8
    }

    pub fn from_severity(severity: u8) -> Option<Self> {
        Self::ALL.get(usize::from(severity)).copied()
    }

    /// True when `self` is at least as severe as `min`
    #[inline]
    pub fn passes(&self, min: LogLevel) -> bool {
        self.severity() <= min.severity()
    }
}

impl Ord for LogLevel {
    /// Orders by importance: `Emergency > Debug`
    fn cmp(&self, other: &Self) -> Ordering {
        other.severity().cmp(&self.severity())
    }
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EMERGENCY" | "EMERG" => Ok(LogLevel::Emergency),
            "ALERT" => Ok(LogLevel::Alert),
            "CRITICAL" | "CRIT" => Ok(LogLevel::Critical),
            "ERROR" | "ERR" => Ok(LogLevel::Error),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "NOTICE" => Ok(LogLevel::Notice),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
