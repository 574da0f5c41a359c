//! Main emitter implementation

use super::{
    config::EmitterConfig,
    diagnostics::{FailureReporter, DEFAULT_REPORT_WINDOW},
    encoder::JsonEncoder,
    error::{EmitterError, Result},
    log_context::{FieldValue, LogContext},
    log_level::LogLevel,
    metrics::EmitterMetrics,
    record::Record,
    sink::Sink,
    timestamp::TimestampFormat,
};
use crate::sinks::{RotatingFileSink, RotationPolicy, UdpSink};
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Long-lived structured log emitter.
///
/// Built once with [`Emitter::builder`] or [`Emitter::from_config`], then
/// shared (e.g. behind an `Arc`) by every thread that logs. Sinks are opened
/// at build time and reused by every call.
///
/// Logging never fails from the caller's point of view: sink errors and
/// panics are isolated per sink, counted in [`EmitterMetrics`], and reported
/// to stderr at a limited rate.
pub struct Emitter {
    min_level: LogLevel,
    encoder: JsonEncoder,
    /// Fields added to every record unless the call sets them
    defaults: LogContext,
    sinks: RwLock<Vec<Box<dyn Sink>>>,
    closed: AtomicBool,
    metrics: EmitterMetrics,
    reporter: FailureReporter,
}

impl Emitter {
    /// Create a builder for Emitter
    ///
    /// # Example
    /// ```
    /// use log_emitter::prelude::*;
    ///
    /// let emitter = Emitter::builder()
    ///     .min_level(LogLevel::Warning)
    ///     .channel("my_logger")
    ///     .build()
    ///     .unwrap();
    /// assert!(!emitter.is_enabled(LogLevel::Info));
    /// ```
    #[must_use]
    pub fn builder() -> EmitterBuilder {
        EmitterBuilder::new()
    }

    /// Build an emitter with a rotating file sink (if `file_path` is set)
    /// followed by a UDP sink (if `udp_port` is set).
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the file cannot be
    /// opened or the UDP host cannot be resolved
    pub fn from_config(config: &EmitterConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Self::builder()
            .min_level(config.min_level)
            .timestamp_format(config.timestamp_format);
        if let Some(channel) = &config.channel {
            builder = builder.channel(channel.clone());
        }
        if let Some(path) = &config.file_path {
            let policy = RotationPolicy::new()
                .with_trigger(config.rotation.trigger(config.max_file_size))
                .with_max_backups(config.max_backups)
                .with_auto_flush(config.auto_flush);
            builder = builder.rotating_file(path.clone(), policy);
        }
        if let Some(port) = config.udp_port {
            builder = builder.udp(config.udp_host.clone(), port);
        }
        builder.build()
    }

    #[inline]
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// True when records at `level` would be emitted
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.passes(self.min_level) && !self.is_closed()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.read().iter().map(|s| s.name().to_string()).collect()
    }

    pub fn metrics(&self) -> &EmitterMetrics {
        &self.metrics
    }

    /// Sink failure reports swallowed by stderr rate limiting
    pub fn suppressed_reports(&self) -> u64 {
        self.reporter.suppressed_count()
    }

    /// Emit one record at `level`.
    ///
    /// Less severe levels than the minimum return before the record is built.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, context: LogContext) {
        if !level.passes(self.min_level) {
            self.metrics.record_filtered();
            return;
        }

        let sinks = self.sinks.read();
        if self.is_closed() {
            self.metrics.record_rejected_after_close();
            return;
        }

        let mut context = context;
        if !self.defaults.is_empty() {
            context.merge_defaults(&self.defaults);
        }

        let record = Record::new(level, message, context);
        let encoded = self.encoder.encode_with_report(&record);
        if encoded.degraded > 0 {
            self.metrics.record_degradations(encoded.degraded);
            let err = EmitterError::EncodingDegradation {
                count: encoded.degraded,
            };
            self.reporter
                .report(&format!("encoder:{}", err.kind()), &err.to_string());
        }

        self.dispatch(&sinks, &encoded.bytes);
    }

    /// Hand one encoded record to every sink, isolating failures per sink
    fn dispatch(&self, sinks: &[Box<dyn Sink>], bytes: &[u8]) {
        let mut has_error = false;

        for sink in sinks {
            match catch_unwind(AssertUnwindSafe(|| sink.accept(bytes))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    has_error = true;
                    self.metrics.record_sink_failure();
                    // Same sink and kind with a different cause is a new report
                    self.reporter.report(
                        &format!("{}:{}:{}", sink.name(), e.kind(), e),
                        &format!("Sink '{}' failed: {}", sink.name(), e),
                    );
                }
                Err(panic_info) => {
                    has_error = true;
                    self.metrics.record_sink_failure();
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    self.reporter.report(
                        &format!("{}:panic:{}", sink.name(), panic_msg),
                        &format!(
                            "Sink '{}' panicked: {}. Other sinks continue to function.",
                            sink.name(),
                            panic_msg
                        ),
                    );
                }
            }
        }

        if has_error {
            self.metrics.record_dropped();
        } else {
            self.metrics.record_logged();
        }
    }

    /// Flush every sink, returning the first error after attempting all
    ///
    /// # Errors
    ///
    /// Returns `EmitterClosed` after [`close`](Self::close), or the first
    /// sink flush error
    pub fn flush(&self) -> Result<()> {
        let sinks = self.sinks.read();
        if self.is_closed() {
            return Err(EmitterError::EmitterClosed);
        }
        flush_all(&sinks)
    }

    /// Flush and release every sink. Later `log` calls are no-ops.
    ///
    /// Calling `close` more than once is allowed; only the first call does
    /// any work.
    ///
    /// # Errors
    ///
    /// Returns the first sink flush error. The sinks are released regardless.
    pub fn close(&self) -> Result<()> {
        let mut sinks = self.sinks.write();
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let result = flush_all(&sinks);
        sinks.clear();
        result
    }

    #[inline]
    pub fn emergency(&self, message: impl Into<String>) {
        self.log(LogLevel::Emergency, message, LogContext::new());
    }

    #[inline]
    pub fn alert(&self, message: impl Into<String>) {
        self.log(LogLevel::Alert, message, LogContext::new());
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message, LogContext::new());
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message, LogContext::new());
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message, LogContext::new());
    }

    #[inline]
    pub fn notice(&self, message: impl Into<String>) {
        self.log(LogLevel::Notice, message, LogContext::new());
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message, LogContext::new());
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message, LogContext::new());
    }

    #[inline]
    pub fn emergency_with(&self, message: impl Into<String>, context: LogContext) {
        self.log(LogLevel::Emergency, message, context);
    }

    #[inline]
    pub fn alert_with(&self, message: impl Into<String>, context: LogContext) {
        self.log(LogLevel::Alert, message, context);
    }

    #[inline]
    pub fn critical_with(&self, message: impl Into<String>, context: LogContext) {
        self.log(LogLevel::Critical, message, context);
    }

    #[inline]
    pub fn error_with(&self, message: impl Into<String>, context: LogContext) {
        self.log(LogLevel::Error, message, context);
    }

    #[inline]
    pub fn warning_with(&self, message: impl Into<String>, context: LogContext) {
        self.log(LogLevel::Warning, message, context);
    }

    #[inline]
    pub fn notice_with(&self, message: impl Into<String>, context: LogContext) {
        self.log(LogLevel::Notice, message, context);
    }

    #[inline]
    pub fn info_with(&self, message: impl Into<String>, context: LogContext) {
        self.log(LogLevel::Info, message, context);
    }

    #[inline]
    pub fn debug_with(&self, message: impl Into<String>, context: LogContext) {
        self.log(LogLevel::Debug, message, context);
    }
}

fn flush_all(sinks: &[Box<dyn Sink>]) -> Result<()> {
    let mut first_error = None;
    for sink in sinks {
        if let Err(e) = sink.flush() {
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

impl Drop for Emitter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Emitter shutting down with {} dropped records (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

enum PendingSink {
    Ready(Box<dyn Sink>),
    RotatingFile(PathBuf, RotationPolicy),
    Udp(String, u16),
}

/// Builder for constructing an Emitter with a fluent API
///
/// Sinks are opened in [`build`](Self::build), in registration order, so
/// any construction error surfaces there.
///
/// # Example
/// ```no_run
/// use log_emitter::prelude::*;
///
/// let emitter = Emitter::builder()
///     .min_level(LogLevel::Warning)
///     .rotating_file("/var/log/app.log", RotationPolicy::new().with_max_size(1024).with_max_backups(2))
///     .udp("127.0.0.1", 9999)
///     .static_field("service", "billing")
///     .build()
///     .expect("Failed to build emitter");
///
/// emitter.error_with("disk full", LogContext::new().with_field("code", 28));
/// ```
pub struct EmitterBuilder {
    min_level: LogLevel,
    sinks: Vec<PendingSink>,
    encoder: JsonEncoder,
    defaults: LogContext,
    report_window: Duration,
    quiet: bool,
}

impl EmitterBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Debug,
            sinks: Vec::new(),
            encoder: JsonEncoder::new(),
            defaults: LogContext::new(),
            report_window: DEFAULT_REPORT_WINDOW,
            quiet: false,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Add an already constructed sink
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(PendingSink::Ready(Box::new(sink)));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sinks.push(PendingSink::Ready(sink));
        self
    }

    /// Add a rotating file sink, opened at build time
    #[must_use = "builder methods return a new value"]
    pub fn rotating_file(mut self, path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        self.sinks
            .push(PendingSink::RotatingFile(path.into(), policy));
        self
    }

    /// Add a UDP sink, resolved and bound at build time
    #[must_use = "builder methods return a new value"]
    pub fn udp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.sinks.push(PendingSink::Udp(host.into(), port));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.encoder = self.encoder.with_channel(channel);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.encoder = self.encoder.with_timestamp_format(format);
        self
    }

    /// Add a field to every record. A field of the same name passed to a
    /// log call takes priority.
    #[must_use = "builder methods return a new value"]
    pub fn static_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.defaults.add_field(key, value);
        self
    }

    /// How long an identical sink failure stays suppressed on stderr
    #[must_use = "builder methods return a new value"]
    pub fn report_window(mut self, window: Duration) -> Self {
        self.report_window = window;
        self
    }

    /// Count sink failures without printing them
    #[must_use = "builder methods return a new value"]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Open every pending sink and build the Emitter
    ///
    /// # Errors
    ///
    /// Returns the first sink construction error
    pub fn build(self) -> Result<Emitter> {
        let mut sinks: Vec<Box<dyn Sink>> = Vec::with_capacity(self.sinks.len());
        for pending in self.sinks {
            let sink: Box<dyn Sink> = match pending {
                PendingSink::Ready(sink) => sink,
                PendingSink::RotatingFile(path, policy) => {
                    Box::new(RotatingFileSink::with_policy(path, policy)?)
                }
                PendingSink::Udp(host, port) => Box::new(UdpSink::new(&host, port)?),
            };
            sinks.push(sink);
        }

        let reporter = if self.quiet {
            FailureReporter::silent(self.report_window)
        } else {
            FailureReporter::new(self.report_window)
        };

        Ok(Emitter {
            min_level: self.min_level,
            encoder: self.encoder,
            defaults: self.defaults,
            sinks: RwLock::new(sinks),
            closed: AtomicBool::new(false),
            metrics: EmitterMetrics::new(),
            reporter,
        })
    }
}

impl Default for EmitterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
