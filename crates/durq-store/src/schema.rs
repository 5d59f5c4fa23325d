//! Database schema management.

use rusqlite::Connection;

/// Initialize the database schema.
pub(crate) fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}

// BLOB columns compare with memcmp, so both tables iterate in byte order.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS namespaces (
    name BLOB PRIMARY KEY
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS entries (
    namespace BLOB NOT NULL,
    key BLOB NOT NULL,
    value BLOB NOT NULL,
    PRIMARY KEY (namespace, key)
) WITHOUT ROWID;
"#;
