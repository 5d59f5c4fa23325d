//! Priority partitions inside one storage transaction.
//!
//! Each priority level owns a namespace named by the single byte equal to
//! that level. Namespaces are created on first write only, and the engine
//! iterates them in byte order, which is ascending priority.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use durq_store::{Namespace, StoreError, Tx};

use crate::key::SortKey;
use crate::priority::Priority;

/// View of the 256 priority partitions through a transaction.
pub struct PriorityIndex<'t> {
    tx: &'t Tx<'t>,
}

impl<'t> PriorityIndex<'t> {
    /// Wrap a transaction.
    pub fn new(tx: &'t Tx<'t>) -> Self {
        Self { tx }
    }

    /// Create the partition for `priority` if absent and return it.
    pub fn ensure(&self, priority: Priority) -> Result<Namespace<'t>, StoreError> {
        self.tx.create_namespace_if_absent(&priority.namespace())
    }

    /// Store `value` under `key` in the partition for `priority`.
    pub fn put(&self, priority: Priority, key: SortKey, value: &[u8]) -> Result<(), StoreError> {
        self.ensure(priority)?.put(&key.to_bytes(), value)
    }

    /// Smallest-key entry of a partition, left in place.
    pub fn first_entry(&self, priority: Priority) -> Result<Option<(SortKey, Vec<u8>)>, StoreError> {
        let Some(partition) = self.partition(priority)? else {
            return Ok(None);
        };
        let entry = partition.cursor().first()?;
        Ok(entry.map(|(key, value)| (decode_key(priority, &key), value)))
    }

    /// Remove `key` from a partition. Returns whether it was present.
    pub fn delete(&self, priority: Priority, key: SortKey) -> Result<bool, StoreError> {
        match self.partition(priority)? {
            Some(partition) => partition.delete(&key.to_bytes()),
            None => Ok(false),
        }
    }

    /// Remove `key` from whichever partition holds it and return that
    /// partition. Keys are unique across partitions, so at most one matches.
    pub fn remove_key(&self, key: SortKey) -> Result<Option<Priority>, StoreError> {
        let raw = key.to_bytes();
        for priority in self.partitions()? {
            let Some(partition) = self.partition(priority)? else {
                continue;
            };
            if partition.delete(&raw)? {
                return Ok(Some(priority));
            }
        }
        Ok(None)
    }

    /// Number of messages at `priority`; zero for an untouched level.
    pub fn count(&self, priority: Priority) -> Result<u64, StoreError> {
        match self.partition(priority)? {
            Some(partition) => partition.count(),
            None => Ok(0),
        }
    }

    /// Levels that have a partition, ascending.
    pub fn partitions(&self) -> Result<Vec<Priority>, StoreError> {
        let names = self.tx.namespace_names()?;
        Ok(names
            .iter()
            .filter_map(|name| Priority::from_namespace(name))
            .collect())
    }

    /// Message count for every existing partition.
    pub fn counts(&self) -> Result<BTreeMap<Priority, u64>, StoreError> {
        let mut counts = BTreeMap::new();
        self.tx.for_each(|name, namespace| {
            if let Some(priority) = Priority::from_namespace(name) {
                counts.insert(priority, namespace.count()?);
            }
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(counts)
    }

    /// Largest key stored in any partition.
    pub fn max_key(&self) -> Result<Option<SortKey>, StoreError> {
        let mut max = None;
        for priority in self.partitions()? {
            let Some(partition) = self.partition(priority)? else {
                continue;
            };
            if let Some((key, _)) = partition.cursor().last()? {
                let key = decode_key(priority, &key);
                max = max.max(Some(key));
            }
        }
        Ok(max)
    }

    fn partition(&self, priority: Priority) -> Result<Option<Namespace<'t>>, StoreError> {
        self.tx.namespace(&priority.namespace())
    }
}

fn decode_key(priority: Priority, raw: &[u8]) -> SortKey {
    match SortKey::from_bytes(raw) {
        Some(key) => key,
        None => panic!(
            "corrupt index: key of {} bytes in partition {}",
            raw.len(),
            priority
        ),
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
