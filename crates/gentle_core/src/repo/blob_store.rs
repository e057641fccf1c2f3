//! Key/blob storage contract and SQLite implementation.
//!
//! # Responsibility
//! - Store opaque UTF-8 blobs under fixed string keys.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `write_blob` replaces the previous value in a single statement.
//! - `read_blob` returns `None` for keys never written.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for blob storage and namespace operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "blob serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid journal data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Storage interface: one opaque blob per key.
pub trait BlobStore {
    fn read_blob(&self, key: &str) -> RepoResult<Option<String>>;
    fn write_blob(&self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed blob store over the `kv_store` table.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl BlobStore for SqliteBlobStore {
    fn read_blob(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_blob(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BlobStore, SqliteBlobStore};
    use crate::db::open_db_in_memory;

    #[test]
    fn missing_key_reads_none() {
        let store = SqliteBlobStore::new(open_db_in_memory().unwrap());
        assert_eq!(store.read_blob("absent").unwrap(), None);
    }

    #[test]
    fn write_replaces_previous_value() {
        let store = SqliteBlobStore::new(open_db_in_memory().unwrap());
        store.write_blob("k", "{\"a\":1}").unwrap();
        store.write_blob("k", "{}").unwrap();
        assert_eq!(store.read_blob("k").unwrap().as_deref(), Some("{}"));

        let rows: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
