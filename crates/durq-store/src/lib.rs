//! # durq store
//!
//! Transactional ordered key-value engine used by the durq queue.
//!
//! ## Features
//!
//! - Named namespaces, iterated in byte order of their names
//! - Exclusive read-write transactions (`Store::update`)
//! - Read-only snapshots that run beside the writer (`Store::view`)
//! - Cursors yielding entries in ascending key order
//!
//! Everything lives in a single SQLite file opened in WAL mode.

pub mod error;
pub mod options;
mod schema;
pub mod store;
pub mod tx;

pub use error::StoreError;
pub use options::StoreOptions;
pub use store::Store;
pub use tx::{Cursor, Entry, Namespace, Tx};
