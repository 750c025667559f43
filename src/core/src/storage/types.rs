use codify_protocol::HistoryEntry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One persisted (query, generated code, language) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub query: String,
    pub code: String,
    pub language: String,
}

impl HistoryRecord {
    pub fn new(
        query: impl Into<String>,
        code: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            code: code.into(),
            language: language.into(),
        }
    }
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(rec: HistoryRecord) -> Self {
        HistoryEntry {
            query: rec.query,
            code: rec.code,
            language: rec.language,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
