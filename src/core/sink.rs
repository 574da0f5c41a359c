//! Sink trait for encoded record destinations

use super::error::Result;

/// A delivery target for encoded log records.
///
/// Sinks take `&self` and synchronize internally, so one emitter can be
/// shared across threads without a global write lock. A sink owns its I/O
/// handle exclusively and acquires it once, at construction.
pub trait Sink: Send + Sync {
    /// Deliver one encoded record. `bytes` holds a single JSON document
    /// without a trailing newline.
    fn accept(&self, bytes: &[u8]) -> Result<()>;

    fn flush(&self) -> Result<()>;

    fn name(&self) -> &str;
}
