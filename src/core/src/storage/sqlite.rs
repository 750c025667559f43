use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection};

use super::types::{HistoryRecord, StorageError};
use super::HistoryStore;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed history log bound to a file path.
///
/// Every operation opens its own connection, runs, and closes it before
/// returning. Concurrent writers (other sessions, other processes on the
/// same file) serialize on SQLite's file lock, waiting up to the busy
/// timeout.
pub struct SqliteHistoryStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteHistoryStore {
    /// Bind to `path`, creating the parent directory and the schema.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn open_with_timeout(path: &Path, busy_timeout: Duration) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unavailable(format!("create {}: {e}", parent.display()))
            })?;
        }
        let store = Self {
            path: path.to_path_buf(),
            busy_timeout,
        };
        store.ensure_schema()?;
        tracing::debug!(path = %store.path.display(), "history store ready");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.path).map_err(|e| {
            StorageError::Unavailable(format!("sqlite open {}: {e}", self.path.display()))
        })?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| StorageError::Unavailable(format!("sqlite busy_timeout: {e}")))?;
        Ok(conn)
    }

    /// Open a connection, run `f`, and close the connection on every path.
    fn with_connection<T>(
        &self,
        op: &str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StorageError> {
        let conn = self.connect()?;
        let result = f(&conn).map_err(|e| StorageError::Unavailable(format!("{op}: {e}")));
        if let Err((_conn, e)) = conn.close() {
            tracing::warn!(op, error = %e, "sqlite close failed");
        }
        result
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn ensure_schema(&self) -> Result<(), StorageError> {
        self.with_connection("ensure_schema", |conn| {
            conn.execute_batch(
                "
                CREATE TABLE IF NOT EXISTS history (
                    query    TEXT NOT NULL,
                    code     TEXT NOT NULL,
                    language TEXT NOT NULL
                );
                ",
            )
        })
    }

    fn append(&self, query: &str, code: &str, language: &str) -> Result<(), StorageError> {
        self.with_connection("append", |conn| {
            conn.execute(
                "INSERT INTO history (query, code, language) VALUES (?1, ?2, ?3)",
                params![query, code, language],
            )
        })?;
        tracing::debug!(language, query_len = query.len(), code_len = code.len(), "history appended");
        Ok(())
    }

    fn recent_records(&self, limit: usize) -> Result<Vec<HistoryRecord>, StorageError> {
        if limit == 0 {
            return Err(StorageError::InvalidArgument(
                "limit must be a positive integer".to_string(),
            ));
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_connection("recent_records", |conn| {
            let mut stmt = conn.prepare(
                "SELECT query, code, language FROM history
                 ORDER BY rowid DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(HistoryRecord {
                    query: row.get(0)?,
                    code: row.get(1)?,
                    language: row.get(2)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
    }

    fn count(&self) -> Result<u64, StorageError> {
        self.with_connection("count", |conn| {
            conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get::<_, i64>(0))
        })
        .map(|n| n.max(0) as u64)
    }
}
