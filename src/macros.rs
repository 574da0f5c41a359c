//! Logging macros for ergonomic message formatting.
//!
//! The macros check the level before formatting, so a filtered call costs
//! one comparison and no allocation.
//!
//! # Examples
//!
//! ```
//! use log_emitter::prelude::*;
//! use log_emitter::{error, info};
//!
//! let emitter = Emitter::builder().build().unwrap();
//!
//! info!(emitter, "Server started");
//!
//! let port = 8080;
//! info!(emitter, "Server listening on port {}", port);
//!
//! // With structured context
//! error!(emitter, ctx: LogContext::new().with_field("code", 28), "write failed: {}", "disk full");
//! ```

/// Log a message at a given level with automatic formatting.
///
/// # Examples
///
/// ```
/// # use log_emitter::prelude::*;
/// # let emitter = Emitter::builder().build().unwrap();
/// use log_emitter::log;
/// log!(emitter, LogLevel::Info, "Simple message");
/// log!(emitter, LogLevel::Error, "Error code: {}", 500);
/// log!(emitter, LogLevel::Notice, ctx: LogContext::new().with_field("user", 7), "login");
/// ```
#[macro_export]
macro_rules! log {
    ($emitter:expr, $level:expr, ctx: $ctx:expr, $($arg:tt)+) => {{
        let emitter = &$emitter;
        let level = $level;
        if emitter.is_enabled(level) {
            emitter.log(level, format!($($arg)+), $ctx);
        }
    }};
    ($emitter:expr, $level:expr, $($arg:tt)+) => {
        $crate::log!($emitter, $level, ctx: $crate::LogContext::new(), $($arg)+)
    };
}

/// Log an emergency-level message.
#[macro_export]
macro_rules! emergency {
    ($emitter:expr, $($arg:tt)+) => {
        $crate::log!($emitter, $crate::LogLevel::Emergency, $($arg)+)
    };
}

/// Log an alert-level message.
#[macro_export]
macro_rules! alert {
    ($emitter:expr, $($arg:tt)+) => {
        $crate::log!($emitter, $crate::LogLevel::Alert, $($arg)+)
    };
}

/// Log a critical-level message.
///
/// # Examples
///
/// ```
/// # use log_emitter::prelude::*;
/// # let emitter = Emitter::builder().build().unwrap();
/// use log_emitter::critical;
/// critical!(emitter, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($emitter:expr, $($arg:tt)+) => {
        $crate::log!($emitter, $crate::LogLevel::Critical, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($emitter:expr, $($arg:tt)+) => {
        $crate::log!($emitter, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use log_emitter::prelude::*;
/// # let emitter = Emitter::builder().build().unwrap();
/// use log_emitter::warning;
/// warning!(emitter, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($emitter:expr, $($arg:tt)+) => {
        $crate::log!($emitter, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log a notice-level message.
#[macro_export]
macro_rules! notice {
    ($emitter:expr, $($arg:tt)+) => {
        $crate::log!($emitter, $crate::LogLevel::Notice, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($emitter:expr, $($arg:tt)+) => {
        $crate::log!($emitter, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($emitter:expr, $($arg:tt)+) => {
        $crate::log!($emitter, $crate::LogLevel::Debug, $($arg)+)
    };
}
