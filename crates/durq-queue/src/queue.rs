//! Priority queue implementation.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use durq_store::{Store, StoreError, StoreOptions};
use tracing::{debug, info};

use crate::error::QueueError;
use crate::index::PriorityIndex;
use crate::key::{KeyGenerator, SortKey};
use crate::message::Message;
use crate::priority::Priority;

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

/// Durable priority queue.
///
/// Every mutating call is one write transaction, and the store admits one
/// writer at a time, so calls from any number of threads are atomic and
/// totally ordered. [`size`](Self::size) reads a snapshot and never waits on
/// a writer.
pub struct PQueue {
    store: Store,
    keys: Arc<KeyGenerator>,
}

impl PQueue {
    /// Open or create a queue file with its own key generator.
    pub fn open(path: impl AsRef<Path>, options: &StoreOptions) -> Result<Self, QueueError> {
        Self::open_with_generator(path, options, Arc::new(KeyGenerator::new()))
    }

    /// Open a queue that mints keys from `keys`, which may be shared with
    /// other queues.
    ///
    /// The generator is advanced past the largest key already on disk, so
    /// new messages order after surviving ones even if the clock went back
    /// since they were written.
    pub fn open_with_generator(
        path: impl AsRef<Path>,
        options: &StoreOptions,
        keys: Arc<KeyGenerator>,
    ) -> Result<Self, QueueError> {
        let store = Store::open(path, options)?;

        let max_key = store.view(|tx| PriorityIndex::new(tx).max_key())?;
        if let Some(key) = max_key {
            keys.observe(key);
        }

        info!("Opened queue at {:?} (max key: {:?})", store.path(), max_key);
        Ok(Self { store, keys })
    }

    /// Path of the queue file.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// The key generator used by this queue.
    pub fn keys(&self) -> &Arc<KeyGenerator> {
        &self.keys
    }

    /// Add a payload at `priority` under a freshly minted key.
    pub fn enqueue(
        &self,
        priority: impl Into<i64>,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Message, QueueError> {
        let priority = Priority::new(priority)?;
        let payload = payload.into();
        let key = self.keys.next();

        self.put(priority, key, &payload)?;

        debug!("Enqueued message {} at priority {}", key.get(), priority);
        Ok(Message::stored(key, priority, payload))
    }

    /// Put a dequeued message back, keeping its original key.
    ///
    /// At the same priority it comes out ahead of everything enqueued after
    /// it was first enqueued. At another priority it still orders by the
    /// time of its original insertion. A message that is still waiting is
    /// moved, so a key is never stored twice.
    pub fn requeue(
        &self,
        priority: impl Into<i64>,
        message: &Message,
    ) -> Result<Message, QueueError> {
        let key = message.key().ok_or(QueueError::NoKey)?;
        let priority = Priority::new(priority)?;

        let previous = self.store.update(|tx| {
            let index = PriorityIndex::new(tx);
            let previous = index.remove_key(key)?;
            index.put(priority, key, message.value())?;
            Ok::<_, StoreError>(previous)
        })?;

        match previous {
            Some(from) => debug!(
                "Moved waiting message {} from priority {} to {}",
                key.get(),
                from,
                priority
            ),
            None => debug!("Requeued message {} at priority {}", key.get(), priority),
        }
        Ok(Message::stored(key, priority, message.value().to_vec()))
    }

    /// Remove and return the oldest message of the most urgent non-empty
    /// priority. `Ok(None)` when the queue is empty.
    pub fn dequeue(&self) -> Result<Option<Message>, QueueError> {
        let message = self.store.update(|tx| {
            let index = PriorityIndex::new(tx);
            for priority in index.partitions()? {
                if let Some((key, value)) = index.first_entry(priority)? {
                    index.delete(priority, key)?;
                    return Ok(Some(Message::stored(key, priority, value)));
                }
            }
            Ok::<_, StoreError>(None)
        })?;

        match &message {
            Some(m) => debug!(
                "Dequeued message {:?} from priority {:?}",
                m.key().map(SortKey::get),
                m.priority().map(Priority::get)
            ),
            None => debug!("Dequeue found the queue empty"),
        }
        Ok(message)
    }

    /// Number of messages waiting at `priority`.
    pub fn size(&self, priority: impl Into<i64>) -> Result<u64, QueueError> {
        let priority = Priority::new(priority)?;
        let count = self.store.view(|tx| PriorityIndex::new(tx).count(priority))?;
        Ok(count)
    }

    /// Message counts for every priority that has ever been written.
    pub fn sizes(&self) -> Result<BTreeMap<Priority, u64>, QueueError> {
        let counts = self.store.view(|tx| PriorityIndex::new(tx).counts())?;
        Ok(counts)
    }

    /// Total number of waiting messages.
    pub fn len(&self) -> Result<u64, QueueError> {
        Ok(self.sizes()?.values().sum())
    }

    /// Whether no message is waiting.
    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.len()? == 0)
    }

    /// Close the queue and release the file.
    pub fn close(self) -> Result<(), QueueError> {
        let path = self.store.path().to_path_buf();
        self.store.close()?;
        info!("Closed queue at {:?}", path);
        Ok(())
    }

    fn put(&self, priority: Priority, key: SortKey, value: &[u8]) -> Result<(), QueueError> {
        self.store
            .update(|tx| PriorityIndex::new(tx).put(priority, key, value))?;
        Ok(())
    }
}
