//! # Log Emitter
//!
//! A structured logging core that writes newline-delimited JSON to a
//! rotating file and sends the same bytes as UDP datagrams.
//!
//! ## Features
//!
//! - **Owned, long-lived emitter**: sinks are opened once and reused
//! - **Syslog levels**: eight severities with early-exit filtering
//! - **Never fails the caller**: sink errors are isolated and rate-limited to stderr
//! - **Thread safe**: share one emitter across workers
//!
//! ```no_run
//! use log_emitter::prelude::*;
//!
//! let emitter = Emitter::builder()
//!     .min_level(LogLevel::Warning)
//!     .rotating_file("log/debug.log", RotationPolicy::new().with_max_size(1024).with_max_backups(2))
//!     .udp("127.0.0.1", 9999)
//!     .build()?;
//!
//! emitter.info("x"); // filtered
//! emitter.error_with("disk full", LogContext::new().with_field("code", 28));
//! # Ok::<(), EmitterError>(())
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Emitter, EmitterBuilder, EmitterConfig, EmitterError, EmitterMetrics, FieldValue,
        JsonEncoder, LogContext, LogLevel, Record, Result, RotationMode, Sink, TimestampFormat,
    };
    pub use crate::sinks::{RotatingFileSink, RotationPolicy, RotationTrigger, UdpSink};
}

pub use crate::core::{
    Emitter, EmitterBuilder, EmitterConfig, EmitterError, EmitterMetrics, EncodedRecord,
    FailureReporter, FieldValue, JsonEncoder, LogContext, LogLevel, Record, Result, RotationMode,
    Sink, TimestampFormat, MAX_CONTEXT_DEPTH,
};
pub use crate::sinks::{RotatingFileSink, RotationPolicy, RotationTrigger, UdpSink};
