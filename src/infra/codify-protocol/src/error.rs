use thiserror::Error;

/// Protocol-level errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown page: {0}")]
    UnknownPage(String),
}
