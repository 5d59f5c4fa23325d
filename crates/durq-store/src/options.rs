//! Options for opening a store.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options used when opening a [`Store`](crate::Store).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// How long to wait for the database lock. `None` waits indefinitely.
    #[serde(default)]
    pub timeout: Option<Duration>,

    /// Open the database read-only. Writes fail with `StoreError::ReadOnly`.
    #[serde(default)]
    pub read_only: bool,

    /// Initial memory-map size in bytes. Zero leaves SQLite's default.
    #[serde(default)]
    pub initial_mmap_size: u64,
}

impl StoreOptions {
    /// Set the lock-acquire timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Open read-only.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the initial memory-map size hint.
    pub fn with_initial_mmap_size(mut self, bytes: u64) -> Self {
        self.initial_mmap_size = bytes;
        self
    }
}
