//! Async handle over [`PQueue`].
//!
//! Queue operations block on SQLite, so each call is moved onto tokio's
//! blocking pool. Clones share the same queue.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use durq_store::StoreOptions;

use crate::error::QueueError;
use crate::message::Message;
use crate::priority::Priority;
use crate::queue::PQueue;

/// Cloneable async handle to a queue.
#[derive(Clone)]
pub struct AsyncPQueue {
    inner: Arc<PQueue>,
}

impl AsyncPQueue {
    /// Wrap an open queue.
    pub fn new(queue: PQueue) -> Self {
        Self {
            inner: Arc::new(queue),
        }
    }

    /// Open a queue file on the blocking pool.
    pub async fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self, QueueError> {
        let path = path.into();
        let queue = blocking(move || PQueue::open(path, &options)).await?;
        Ok(Self::new(queue))
    }

    /// The underlying synchronous queue.
    pub fn queue(&self) -> &PQueue {
        &self.inner
    }

    /// See [`PQueue::enqueue`].
    pub async fn enqueue(
        &self,
        priority: impl Into<i64>,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Message, QueueError> {
        let (priority, payload) = (priority.into(), payload.into());
        let queue = Arc::clone(&self.inner);
        blocking(move || queue.enqueue(priority, payload)).await
    }

    /// See [`PQueue::requeue`].
    pub async fn requeue(
        &self,
        priority: impl Into<i64>,
        message: Message,
    ) -> Result<Message, QueueError> {
        let priority = priority.into();
        let queue = Arc::clone(&self.inner);
        blocking(move || queue.requeue(priority, &message)).await
    }

    /// See [`PQueue::dequeue`].
    pub async fn dequeue(&self) -> Result<Option<Message>, QueueError> {
        let queue = Arc::clone(&self.inner);
        blocking(move || queue.dequeue()).await
    }

    /// See [`PQueue::size`].
    pub async fn size(&self, priority: impl Into<i64>) -> Result<u64, QueueError> {
        let priority = priority.into();
        let queue = Arc::clone(&self.inner);
        blocking(move || queue.size(priority)).await
    }

    /// See [`PQueue::sizes`].
    pub async fn sizes(&self) -> Result<BTreeMap<Priority, u64>, QueueError> {
        let queue = Arc::clone(&self.inner);
        blocking(move || queue.sizes()).await
    }

    /// See [`PQueue::len`].
    pub async fn len(&self) -> Result<u64, QueueError> {
        let queue = Arc::clone(&self.inner);
        blocking(move || queue.len()).await
    }

    /// Close the queue. Fails with [`QueueError::InUse`] while other clones
    /// of this handle are alive.
    pub async fn close(self) -> Result<(), QueueError> {
        let queue = Arc::try_unwrap(self.inner)
            .map_err(|shared| QueueError::InUse(Arc::strong_count(&shared) - 1))?;
        blocking(move || queue.close()).await
    }
}

async fn blocking<T, F>(f: F) -> Result<T, QueueError>
where
    F: FnOnce() -> Result<T, QueueError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| QueueError::Background(e.to_string()))?
}
