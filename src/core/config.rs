//! Emitter configuration
//!
//! `EmitterConfig` is the whole configuration surface. It is read once at
//! startup (from a caller's own config format via serde, or from the
//! environment) and handed to [`Emitter::from_config`](crate::Emitter::from_config).

use super::error::{EmitterError, Result};
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use crate::sinks::rotating_file::{RotationTrigger, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_BYTES};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;

/// Default UDP target host
pub const DEFAULT_UDP_HOST: &str = "localhost";

/// When the file sink rotates, paired with `max_file_size`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    #[default]
    Size,
    Daily,
    SizeOrDaily,
}

impl RotationMode {
    #[must_use]
    pub fn trigger(self, max_bytes: u64) -> RotationTrigger {
        match self {
            RotationMode::Size => RotationTrigger::Size { max_bytes },
            RotationMode::Daily => RotationTrigger::Daily,
            RotationMode::SizeOrDaily => RotationTrigger::SizeOrDaily { max_bytes },
        }
    }
}

impl fmt::Display for RotationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotationMode::Size => "size",
            RotationMode::Daily => "daily",
            RotationMode::SizeOrDaily => "size_or_daily",
        };
        f.write_str(name)
    }
}

impl FromStr for RotationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "size" => Ok(RotationMode::Size),
            "daily" => Ok(RotationMode::Daily),
            "size_or_daily" | "size-or-daily" => Ok(RotationMode::SizeOrDaily),
            _ => Err("unknown rotation mode, expected size, daily or size_or_daily".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub min_level: LogLevel,
    /// Rotating file sink is enabled when set
    pub file_path: Option<PathBuf>,
    pub max_file_size: u64,
    pub max_backups: usize,
    pub rotation: RotationMode,
    /// Flush the file after every record
    pub auto_flush: bool,
    pub udp_host: String,
    /// UDP sink is enabled when set
    pub udp_port: Option<u16>,
    pub channel: Option<String>,
    pub timestamp_format: TimestampFormat,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Debug,
            file_path: None,
            max_file_size: DEFAULT_MAX_BYTES,
            max_backups: DEFAULT_MAX_BACKUPS,
            rotation: RotationMode::default(),
            auto_flush: true,
            udp_host: DEFAULT_UDP_HOST.to_string(),
            udp_port: None,
            channel: None,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl EmitterConfig {
    /// Read configuration from `<PREFIX>_*` environment variables.
    ///
    /// | Variable              | Field           |
    /// |-----------------------|-----------------|
    /// | `<PREFIX>_LEVEL`       | `min_level`     |
    /// | `<PREFIX>_FILE`        | `file_path`     |
    /// | `<PREFIX>_MAX_BYTES`   | `max_file_size` |
    /// | `<PREFIX>_MAX_BACKUPS` | `max_backups`   |
    /// | `<PREFIX>_ROTATION`    | `rotation`      |
    /// | `<PREFIX>_AUTO_FLUSH`  | `auto_flush`    |
    /// | `<PREFIX>_HOST`        | `udp_host`      |
    /// | `<PREFIX>_PORT`        | `udp_port`      |
    /// | `<PREFIX>_CHANNEL`     | `channel`       |
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a variable is set but cannot be parsed
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a variable is set but cannot be parsed
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{}_{}", prefix, name);
            lookup(&key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        };

        let mut config = Self::default();
        if let Some(level) = parse_var(var("LEVEL"))? {
            config.min_level = level;
        }
        if let Some((_, path)) = var("FILE") {
            config.file_path = Some(PathBuf::from(path));
        }
        if let Some(max) = parse_var(var("MAX_BYTES"))? {
            config.max_file_size = max;
        }
        if let Some(count) = parse_var(var("MAX_BACKUPS"))? {
            config.max_backups = count;
        }
        if let Some(mode) = parse_var(var("ROTATION"))? {
            config.rotation = mode;
        }
        if let Some(enabled) = parse_var(var("AUTO_FLUSH"))? {
            config.auto_flush = enabled;
        }
        if let Some((_, host)) = var("HOST") {
            config.udp_host = host;
        }
        config.udp_port = parse_var(var("PORT"))?;
        if let Some((_, channel)) = var("CHANNEL") {
            config.channel = Some(channel);
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a zero size threshold, an empty
    /// file path, port 0 or an empty UDP host
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(EmitterError::config(
                "EmitterConfig",
                "max_file_size must be greater than zero",
            ));
        }
        if self
            .file_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(EmitterError::config("EmitterConfig", "file_path is empty"));
        }
        if let Some(port) = self.udp_port {
            if port == 0 {
                return Err(EmitterError::config("EmitterConfig", "udp_port must not be 0"));
            }
            if self.udp_host.trim().is_empty() {
                return Err(EmitterError::config("EmitterConfig", "udp_host is empty"));
            }
        }
        Ok(())
    }
}

fn parse_var<T>(entry: Option<(String, String)>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match entry {
        None => Ok(None),
        Some((key, raw)) => raw
            .parse()
            .map(Some)
            .map_err(|e| EmitterError::config(key, format!("cannot parse '{}': {}", raw, e))),
    }
}
