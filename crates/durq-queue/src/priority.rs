//! Priority levels.

use std::fmt;

use crate::error::QueueError;

/// A priority level in `0..=255`. Lower numbers dequeue first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    /// Most urgent level.
    pub const HIGHEST: Priority = Priority(0);
    /// Least urgent level.
    pub const LOWEST: Priority = Priority(u8::MAX);

    /// Validate a priority value.
    pub fn new(value: impl Into<i64>) -> Result<Self, QueueError> {
        let value = value.into();
        u8::try_from(value)
            .map(Priority)
            .map_err(|_| QueueError::InvalidPriority(value))
    }

    /// The numeric level.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Name of the storage namespace holding this level.
    pub(crate) fn namespace(self) -> [u8; 1] {
        [self.0]
    }

    /// Inverse of [`namespace`](Self::namespace); `None` for foreign namespaces.
    pub(crate) fn from_namespace(name: &[u8]) -> Option<Self> {
        match name {
            [level] => Some(Priority(*level)),
            _ => None,
        }
    }
}

impl From<u8> for Priority {
    fn from(level: u8) -> Self {
        Priority(level)
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        i64::from(priority.0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
