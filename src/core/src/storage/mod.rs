mod sqlite;
mod types;

pub use sqlite::SqliteHistoryStore;
pub use types::{HistoryRecord, StorageError};

/// Append-only log of successful generations.
///
/// All methods use `&self`; implementations own their connection handling.
pub trait HistoryStore: Send + Sync + 'static {
    /// Create the record table if absent. Safe to call repeatedly.
    fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Append one immutable record. The language label is not validated.
    fn append(&self, query: &str, code: &str, language: &str) -> Result<(), StorageError>;

    /// Up to `limit` records, most recent first. `limit` must be positive.
    fn recent_records(&self, limit: usize) -> Result<Vec<HistoryRecord>, StorageError>;

    /// Total number of records.
    fn count(&self) -> Result<u64, StorageError>;
}
