//! Store handle: opening, transactions, closing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::options::StoreOptions;
use crate::schema::init_schema;
use crate::tx::Tx;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

/// Idle reader connections kept for reuse.
const MAX_IDLE_READERS: usize = 4;

/// Handle to an open database file.
///
/// Writers share a single connection behind a mutex and take SQLite's
/// write lock with `BEGIN IMMEDIATE`, so at most one read-write transaction
/// is active at a time, across threads and across processes. Readers use
/// their own connections and see a WAL snapshot, so they never wait on the
/// writer.
pub struct Store {
    path: PathBuf,
    options: StoreOptions,
    writer: Mutex<Connection>,
    readers: Mutex<Vec<Connection>>,
}

impl Store {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>, options: &StoreOptions) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if !options.read_only {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let writer = open_connection(&path, options, options.read_only)?;
        let writer = if options.read_only {
            writer
        } else {
            prepare_writer(&path, writer)?
        };

        info!(
            "Opened store at {:?} (read_only: {}, timeout: {:?})",
            path, options.read_only, options.timeout
        );

        Ok(Self {
            path,
            options: options.clone(),
            writer: Mutex::new(writer),
            readers: Mutex::new(Vec::new()),
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store was opened read-only.
    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    /// Run `f` inside one exclusive read-write transaction.
    ///
    /// The transaction commits iff `f` returns `Ok`; otherwise it is rolled
    /// back and the error is returned unchanged.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Tx<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        if self.options.read_only {
            return Err(StoreError::ReadOnly.into());
        }

        let mut conn = self.writer.lock();
        let inner = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let tx = Tx::new(inner, true);

        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run `f` against a read-only snapshot.
    pub fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Tx<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.checkout_reader()?;
        let result = run_read(&mut conn, f);
        self.checkin_reader(conn);
        result
    }

    /// Close every connection and release the file.
    pub fn close(self) -> Result<(), StoreError> {
        for reader in self.readers.into_inner() {
            reader.close().map_err(|(_, e)| e)?;
        }
        self.writer.into_inner().close().map_err(|(_, e)| e)?;

        info!("Closed store at {:?}", self.path);
        Ok(())
    }

    fn checkout_reader(&self) -> Result<Connection, StoreError> {
        let idle = self.readers.lock().pop();
        match idle {
            Some(conn) => Ok(conn),
            None => {
                debug!("Opening reader connection on {:?}", self.path);
                open_connection(&self.path, &self.options, true)
            }
        }
    }

    fn checkin_reader(&self, conn: Connection) {
        let mut readers = self.readers.lock();
        if readers.len() < MAX_IDLE_READERS {
            readers.push(conn);
        }
    }
}

fn run_read<T, E, F>(conn: &mut Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Tx<'_>) -> Result<T, E>,
    E: From<StoreError>,
{
    let inner = conn
        .transaction_with_behavior(TransactionBehavior::Deferred)
        .map_err(StoreError::from)?;
    let tx = Tx::new(inner, false);

    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

fn open_connection(
    path: &Path,
    options: &StoreOptions,
    read_only: bool,
) -> Result<Connection, StoreError> {
    let flags = if read_only {
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
    } else {
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
    };

    let conn = Connection::open_with_flags(path, flags).map_err(StoreError::from_open)?;

    match options.timeout {
        Some(timeout) => conn.busy_timeout(timeout)?,
        None => conn.busy_handler(Some(wait_forever))?,
    }

    if options.initial_mmap_size > 0 {
        let size = i64::try_from(options.initial_mmap_size).unwrap_or(i64::MAX);
        // Builds without mmap support answer with no row.
        conn.pragma_update_and_check(None, "mmap_size", size, |row| row.get::<_, i64>(0))
            .optional()?;
    }

    Ok(conn)
}

/// Switch a read-write connection to WAL and create the schema.
fn prepare_writer(path: &Path, mut conn: Connection) -> Result<Connection, StoreError> {
    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(StoreError::from_open)?;
    debug!("Journal mode for {:?}: {}", path, mode);

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(StoreError::from_open)?;
    init_schema(&tx)?;
    tx.commit()?;
    Ok(conn)
}

/// Busy handler used when no timeout is configured.
fn wait_forever(_attempts: i32) -> bool {
    std::thread::sleep(Duration::from_millis(1));
    true
}
