//! Configuration schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Log levels accepted by `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

impl Config {
    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "queue.path".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                message: format!("expected one of {:?}, got {:?}", LOG_LEVELS, self.logging.level),
            });
        }
        Ok(())
    }
}

/// Queue file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSection {
    /// Database file.
    #[serde(default = "default_queue_path")]
    pub path: PathBuf,

    /// Lock-acquire timeout in milliseconds. Absent waits indefinitely.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Open read-only.
    #[serde(default)]
    pub read_only: bool,

    /// Initial memory-map size in bytes (0 = engine default).
    #[serde(default)]
    pub initial_mmap_size: u64,
}

impl QueueSection {
    /// Lock timeout as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            path: default_queue_path(),
            timeout_ms: None,
            read_only: false,
            initial_mmap_size: 0,
        }
    }
}

fn default_queue_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("durq").join("queue.db"))
        .unwrap_or_else(|| PathBuf::from("/tmp/durq/queue.db"))
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
