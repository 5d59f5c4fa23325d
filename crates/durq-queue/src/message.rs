//! Queue messages.

use std::borrow::Cow;

use crate::key::SortKey;
use crate::priority::Priority;

/// A message in the priority queue.
///
/// A message built with [`Message::new`] is fresh: it has no key and no
/// priority. Messages returned by the queue carry the key they were stored
/// under and the priority they were stored at. A dequeued message is a
/// detached copy; it only returns to storage through
/// [`PQueue::requeue`](crate::PQueue::requeue).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    key: Option<SortKey>,
    value: Vec<u8>,
    priority: Option<Priority>,
}

impl Message {
    /// Create a fresh message.
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: None,
            value: value.into(),
            priority: None,
        }
    }

    pub(crate) fn stored(key: SortKey, priority: Priority, value: Vec<u8>) -> Self {
        Self {
            key: Some(key),
            value,
            priority: Some(priority),
        }
    }

    /// Sort key, `None` if the message was never enqueued.
    pub fn key(&self) -> Option<SortKey> {
        self.key
    }

    /// Priority the message was stored at, `None` if fresh.
    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Whether the message was never enqueued.
    pub fn is_fresh(&self) -> bool {
        self.key.is_none()
    }

    /// Payload bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Take the payload.
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Payload as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }
}
