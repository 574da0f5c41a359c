//! Core emitter types and traits

pub mod config;
pub mod depth_limit;
pub mod diagnostics;
pub mod emitter;
pub mod encoder;
pub mod error;
pub mod log_context;
pub mod log_level;
pub mod metrics;
pub mod record;
pub mod sink;
pub mod timestamp;

pub use config::{EmitterConfig, RotationMode};
pub use depth_limit::MAX_CONTEXT_DEPTH;
pub use diagnostics::FailureReporter;
pub use emitter::{Emitter, EmitterBuilder};
pub use encoder::{EncodedRecord, JsonEncoder};
pub use error::{EmitterError, Result};
pub use log_context::{FieldValue, LogContext};
pub use log_level::LogLevel;
pub use metrics::EmitterMetrics;
pub use record::Record;
pub use sink::Sink;
pub use timestamp::TimestampFormat;
