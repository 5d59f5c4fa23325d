//! Queue errors.

use durq_store::StoreError;
use thiserror::Error;

/// Queue error types.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Priority outside `0..=255`.
    #[error("Invalid priority {0}: must be within 0..=255")]
    InvalidPriority(i64),

    /// Requeue of a message that was never enqueued.
    #[error("Cannot requeue a message without a key")]
    NoKey,

    /// Storage engine failure, surfaced unchanged.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The queue cannot close while other handles share it.
    #[error("Queue is still shared by {0} other handle(s)")]
    InUse(usize),

    /// A blocking queue operation could not be joined.
    #[error("Background task failed: {0}")]
    Background(String),
}
