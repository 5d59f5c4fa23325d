//! Transactions, namespaces and cursors.

use std::ops::ControlFlow;

use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::error::StoreError;

#[cfg(test)]
#[path = "tx_tests.rs"]
mod tests;

/// A key/value pair read from a namespace.
pub type Entry = (Vec<u8>, Vec<u8>);

/// An open transaction, handed to the closures of
/// [`Store::update`](crate::Store::update) and [`Store::view`](crate::Store::view).
pub struct Tx<'c> {
    inner: Transaction<'c>,
    writable: bool,
}

impl<'c> Tx<'c> {
    pub(crate) fn new(inner: Transaction<'c>, writable: bool) -> Self {
        Self { inner, writable }
    }

    pub(crate) fn commit(self) -> Result<(), StoreError> {
        self.inner.commit()?;
        Ok(())
    }

    /// Whether this transaction may write.
    pub fn writable(&self) -> bool {
        self.writable
    }

    /// Create the namespace `name` unless it exists, and return it.
    pub fn create_namespace_if_absent(&self, name: &[u8]) -> Result<Namespace<'_>, StoreError> {
        if !self.writable {
            return Err(StoreError::ReadOnly);
        }
        self.inner
            .prepare_cached("INSERT OR IGNORE INTO namespaces (name) VALUES (?1)")?
            .execute([name])?;
        Ok(Namespace::new(&self.inner, name, self.writable))
    }

    /// Look up an existing namespace.
    pub fn namespace(&self, name: &[u8]) -> Result<Option<Namespace<'_>>, StoreError> {
        let exists = self
            .inner
            .prepare_cached("SELECT 1 FROM namespaces WHERE name = ?1")?
            .exists([name])?;
        Ok(exists.then(|| Namespace::new(&self.inner, name, self.writable)))
    }

    /// Names of all namespaces, in ascending byte order.
    pub fn namespace_names(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        let mut stmt = self
            .inner
            .prepare_cached("SELECT name FROM namespaces ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<Vec<u8>>, _>>()?;
        Ok(names)
    }

    /// Visit every namespace in ascending byte order of its name.
    ///
    /// Iteration stops as soon as `visit` returns `ControlFlow::Break`.
    pub fn for_each<F>(&self, mut visit: F) -> Result<(), StoreError>
    where
        F: FnMut(&[u8], &Namespace<'_>) -> Result<ControlFlow<()>, StoreError>,
    {
        for name in self.namespace_names()? {
            let namespace = Namespace::new(&self.inner, &name, self.writable);
            if visit(name.as_slice(), &namespace)?.is_break() {
                break;
            }
        }
        Ok(())
    }
}

/// A named, ordered keyspace inside a transaction.
pub struct Namespace<'t> {
    conn: &'t Connection,
    name: Vec<u8>,
    writable: bool,
}

impl<'t> Namespace<'t> {
    fn new(conn: &'t Connection, name: &[u8], writable: bool) -> Self {
        Self {
            conn,
            name: name.to_vec(),
            writable,
        }
    }

    /// Namespace name.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Insert or overwrite `key`.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.conn
            .prepare_cached(
                "INSERT INTO entries (namespace, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value",
            )?
            .execute(params![self.name, key, value])?;
        Ok(())
    }

    /// Read the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self
            .conn
            .prepare_cached("SELECT value FROM entries WHERE namespace = ?1 AND key = ?2")?
            .query_row(params![self.name, key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Remove `key`. Returns whether it was present.
    pub fn delete(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.ensure_writable()?;
        let removed = self
            .conn
            .prepare_cached("DELETE FROM entries WHERE namespace = ?1 AND key = ?2")?
            .execute(params![self.name, key])?;
        Ok(removed > 0)
    }

    /// Number of entries.
    pub fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .prepare_cached("SELECT COUNT(*) FROM entries WHERE namespace = ?1")?
            .query_row([&self.name], |row| row.get(0))?;
        match u64::try_from(count) {
            Ok(count) => Ok(count),
            Err(_) => panic!("negative entry count {} in namespace {:?}", count, self.name),
        }
    }

    /// A cursor positioned before the first entry.
    pub fn cursor(&self) -> Cursor<'_, 't> {
        Cursor {
            namespace: self,
            position: None,
        }
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.writable {
            Ok(())
        } else {
            Err(StoreError::ReadOnly)
        }
    }

    fn seek(&self, sql: &str, after: Option<&[u8]>) -> Result<Option<Entry>, StoreError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let read = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Entry> {
            Ok((row.get(0)?, row.get(1)?))
        };
        let entry = match after {
            Some(key) => stmt.query_row(params![self.name, key], read),
            None => stmt.query_row([&self.name], read),
        }
        .optional()?;
        Ok(entry)
    }
}

/// Walks a namespace in ascending key order.
pub struct Cursor<'a, 't> {
    namespace: &'a Namespace<'t>,
    position: Option<Vec<u8>>,
}

impl Cursor<'_, '_> {
    /// Move to the smallest key.
    pub fn first(&mut self) -> Result<Option<Entry>, StoreError> {
        let entry = self.namespace.seek(
            "SELECT key, value FROM entries WHERE namespace = ?1 ORDER BY key ASC LIMIT 1",
            None,
        )?;
        Ok(self.settle(entry))
    }

    /// Move to the largest key.
    pub fn last(&mut self) -> Result<Option<Entry>, StoreError> {
        let entry = self.namespace.seek(
            "SELECT key, value FROM entries WHERE namespace = ?1 ORDER BY key DESC LIMIT 1",
            None,
        )?;
        Ok(self.settle(entry))
    }

    /// Move to the next key. An unpositioned cursor behaves like [`first`](Self::first).
    pub fn next(&mut self) -> Result<Option<Entry>, StoreError> {
        let Some(position) = self.position.clone() else {
            return self.first();
        };
        let entry = self.namespace.seek(
            "SELECT key, value FROM entries WHERE namespace = ?1 AND key > ?2
             ORDER BY key ASC LIMIT 1",
            Some(&position),
        )?;
        Ok(self.settle(entry))
    }

    /// Delete the entry under the cursor. Returns whether one was removed.
    pub fn delete(&mut self) -> Result<bool, StoreError> {
        match self.position.as_deref() {
            Some(key) => self.namespace.delete(key),
            None => Ok(false),
        }
    }

    // Past the end the cursor keeps its last position, so `next` stays exhausted.
    fn settle(&mut self, entry: Option<Entry>) -> Option<Entry> {
        if let Some((key, _)) = &entry {
            self.position = Some(key.clone());
        }
        entry
    }
}
