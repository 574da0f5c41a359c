//! Rotating file sink
//!
//! Appends one encoded record per line and rotates to numbered backups
//! (`app.log.1`, `app.log.2`, ...) when the configured trigger fires.
//! Appends and rotation share one mutex, so concurrent callers never see
//! interleaved lines or a rotation in the middle of another write.

use crate::core::error::{EmitterError, Result};
use crate::core::sink::Sink;
use chrono::{DateTime, Local, NaiveDate};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default size threshold (10 MB)
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of retained backups
pub const DEFAULT_MAX_BACKUPS: usize = 5;

/// Condition that triggers rotation
///
/// # Examples
///
/// ```
/// use log_emitter::sinks::RotationTrigger;
///
/// // Rotate when the file reaches 100 MB
/// let size = RotationTrigger::size(100 * 1024 * 1024);
///
/// // Rotate on the first write of a new local day, or at 50 MB
/// let both = RotationTrigger::SizeOrDaily { max_bytes: 50 * 1024 * 1024 };
/// assert_eq!(both.max_bytes(), Some(50 * 1024 * 1024));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationTrigger {
    /// Rotate once the file size reaches `max_bytes`
    Size { max_bytes: u64 },

    /// Rotate on the first write after the local date changes
    Daily,

    /// Rotate on size OR date change, whichever comes first
    SizeOrDaily { max_bytes: u64 },
}

impl Default for RotationTrigger {
    fn default() -> Self {
        RotationTrigger::Size {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl RotationTrigger {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationTrigger::Size { max_bytes }
    }

    #[must_use]
    pub fn max_bytes(&self) -> Option<u64> {
        match self {
            RotationTrigger::Size { max_bytes } | RotationTrigger::SizeOrDaily { max_bytes } => {
                Some(*max_bytes)
            }
            RotationTrigger::Daily => None,
        }
    }

    fn is_daily(&self) -> bool {
        matches!(
            self,
            RotationTrigger::Daily | RotationTrigger::SizeOrDaily { .. }
        )
    }
}

/// Configuration for the rotating file sink
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    pub trigger: RotationTrigger,
    /// Maximum number of rotated files to keep
    pub max_backups: usize,
    /// Flush after every record instead of waiting for `flush()`
    pub auto_flush: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            trigger: RotationTrigger::default(),
            max_backups: DEFAULT_MAX_BACKUPS,
            auto_flush: true,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_trigger(mut self, trigger: RotationTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Equivalent to `with_trigger(RotationTrigger::Size { max_bytes })`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, max_bytes: u64) -> Self {
        self.trigger = RotationTrigger::Size { max_bytes };
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = enabled;
        self
    }

    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a zero size threshold
    pub fn validate(&self) -> Result<()> {
        if self.trigger.max_bytes() == Some(0) {
            return Err(EmitterError::config(
                "RotatingFileSink",
                "max file size must be greater than zero",
            ));
        }
        Ok(())
    }
}

struct FileState {
    writer: Option<BufWriter<File>>,
    current_size: u64,
    /// File offset just past the last complete line
    line_end: u64,
    /// Local date the live file was started on, for daily rotation
    opened_on: NaiveDate,
}

/// Size- or date-rotated file sink
///
/// # Examples
///
/// ```no_run
/// use log_emitter::sinks::{RotatingFileSink, RotationPolicy};
///
/// let policy = RotationPolicy::new().with_max_size(1024).with_max_backups(2);
/// let sink = RotatingFileSink::with_policy("/var/log/app.log", policy).unwrap();
/// ```
pub struct RotatingFileSink {
    base_path: PathBuf,
    name: String,
    policy: RotationPolicy,
    state: Mutex<FileState>,
    rotations: AtomicU64,
}

impl RotatingFileSink {
    /// Create a sink with the default policy
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// # Errors
    ///
    /// Returns error if the policy is invalid or the file cannot be created
    /// or opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        policy.validate()?;
        let base_path = path.as_ref().to_path_buf();
        if base_path.as_os_str().is_empty() {
            return Err(EmitterError::config("RotatingFileSink", "empty file path"));
        }

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                EmitterError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, opened_on) = Self::open_append(&base_path).map_err(|e| {
            EmitterError::io_operation(
                "open log file",
                format!("Failed to open '{}'", base_path.display()),
                e,
            )
        })?;

        Ok(Self {
            name: format!("file:{}", base_path.display()),
            base_path,
            policy,
            state: Mutex::new(FileState {
                writer: Some(BufWriter::new(file)),
                current_size,
                line_end: current_size,
                opened_on,
            }),
            rotations: AtomicU64::new(0),
        })
    }

    fn open_append(path: &Path) -> io::Result<(File, u64, NaiveDate)> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let metadata = file.metadata()?;
        let opened_on = metadata
            .modified()
            .map(|t| DateTime::<Local>::from(t).date_naive())
            .unwrap_or_else(|_| Local::now().date_naive());
        Ok((file, metadata.len(), opened_on))
    }

    /// Backup file path for a given index (`app.log` -> `app.log.3`)
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut path = self.base_path.clone();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log")
            .to_string();
        path.set_file_name(format!("{}.{}", filename, index));
        path
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes written to the live file, as tracked by the sink
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    /// Number of completed rotations since construction
    #[must_use]
    pub fn rotation_count(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    fn rotation_error(&self, message: String) -> EmitterError {
        EmitterError::sink_rotation(self.base_path.display().to_string(), message)
    }

    /// Close the live file, shift backups, and start an empty file.
    ///
    /// Must be called with the state lock held.
    fn rotate(&self, state: &mut FileState) -> Result<()> {
        if let Some(mut writer) = state.writer.take() {
            writer
                .flush()
                .map_err(|e| self.rotation_error(format!("Failed to flush before rotation: {}", e)))?;
        }

        let max = self.policy.max_backups;
        let file = if max == 0 {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.base_path)
                .map_err(|e| self.rotation_error(format!("Failed to truncate log file: {}", e)))?
        } else {
            let oldest = self.backup_path(max);
            match fs::remove_file(&oldest) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(self.rotation_error(format!(
                        "Failed to remove oldest backup '{}': {}",
                        oldest.display(),
                        e
                    )))
                }
            }

            for i in (1..max).rev() {
                let old_path = self.backup_path(i);
                if !old_path.exists() {
                    continue;
                }
                let new_path = self.backup_path(i + 1);
                if fs::rename(&old_path, &new_path).is_err() {
                    // Some platforms refuse to rename onto an existing file
                    let _ = fs::remove_file(&new_path);
                    fs::rename(&old_path, &new_path).map_err(|e| {
                        self.rotation_error(format!(
                            "Failed to shift backup '{}': {}",
                            old_path.display(),
                            e
                        ))
                    })?;
                }
            }

            if self.base_path.exists() {
                fs::rename(&self.base_path, self.backup_path(1)).map_err(|e| {
                    self.rotation_error(format!("Failed to rotate current log file: {}", e))
                })?;
            }

            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.base_path)
                .map_err(|e| self.rotation_error(format!("Failed to create new log file: {}", e)))?
        };

        state.writer = Some(BufWriter::new(file));
        state.current_size = 0;
        state.line_end = 0;
        state.opened_on = Local::now().date_naive();
        self.rotations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Rotate, and if that fails keep logging into whatever file sits at the
    /// base path. The rotation error is still returned for reporting.
    fn rotate_or_recover(&self, state: &mut FileState) -> Result<()> {
        let err = match self.rotate(state) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        if state.writer.is_none() {
            if let Ok((file, size, opened_on)) = Self::open_append(&self.base_path) {
                state.writer = Some(BufWriter::new(file));
                state.line_end = size;
                state.opened_on = opened_on;
            }
        }
        // Let the file grow past the limit rather than retry on every write
        state.current_size = 0;
        Err(err)
    }

    fn size_exceeded(&self, state: &FileState) -> bool {
        self.policy
            .trigger
            .max_bytes()
            .is_some_and(|max| state.current_size >= max)
    }

    fn date_changed(&self, state: &FileState) -> bool {
        self.policy.trigger.is_daily() && Local::now().date_naive() != state.opened_on
    }
}

fn write_line(writer: &mut BufWriter<File>, bytes: &[u8], flush: bool) -> io::Result<()> {
    writer.write_all(bytes)?;
    writer.write_all(b"\n")?;
    if flush {
        writer.flush()?;
    }
    Ok(())
}

/// Drop a half-written record so the next one starts on its own line.
///
/// If the file cannot be put back on a line boundary the writer is
/// released and the next record reopens the file.
fn discard_partial_line(state: &mut FileState) {
    let Some(writer) = state.writer.take() else {
        return;
    };
    let (mut file, buffered) = writer.into_parts();
    let buffered = buffered.unwrap_or_else(|panicked| panicked.into_inner());
    if restore_line_boundary(&mut file, &buffered, state.line_end).is_ok() {
        state.writer = Some(BufWriter::new(file));
    }
}

/// Make the file exactly `line_end` bytes long. `buffered` holds bytes that
/// were accepted by the writer but never reached the file.
fn restore_line_boundary(file: &mut File, buffered: &[u8], line_end: u64) -> io::Result<()> {
    let on_disk = file.metadata()?.len();
    if on_disk >= line_end {
        return file.set_len(line_end);
    }
    let missing = usize::try_from(line_end - on_disk)
        .unwrap_or(usize::MAX)
        .min(buffered.len());
    file.write_all(&buffered[..missing])
}

impl Sink for RotatingFileSink {
    fn accept(&self, bytes: &[u8]) -> Result<()> {
        let mut state = self.state.lock();

        // Records from a new day start a new file
        if self.date_changed(&state) && state.current_size > 0 {
            self.rotate_or_recover(&mut state)?;
        }

        if state.writer.is_none() {
            let (file, size, opened_on) = Self::open_append(&self.base_path).map_err(|e| {
                EmitterError::sink_write(&self.name, format!("Failed to reopen log file: {}", e))
            })?;
            state.writer = Some(BufWriter::new(file));
            state.current_size = size;
            state.line_end = size;
            state.opened_on = opened_on;
        }

        let line_len = bytes.len() as u64 + 1;
        if let Some(writer) = state.writer.as_mut() {
            if let Err(e) = write_line(writer, bytes, self.policy.auto_flush) {
                discard_partial_line(&mut state);
                return Err(EmitterError::sink_write(
                    &self.name,
                    format!("Failed to write record: {}", e),
                ));
            }
            state.line_end += line_len;
        }
        state.current_size += line_len;

        if self.size_exceeded(&state) {
            self.rotate_or_recover(&mut state)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(writer) = state.writer.as_mut() {
            writer.flush().map_err(|e| {
                EmitterError::sink_write(&self.name, format!("Failed to flush: {}", e))
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        // Best effort flush, the handle is released with the writer
        if let Some(mut writer) = self.state.get_mut().writer.take() {
            let _ = writer.flush();
        }
    }
}
