mod auth;
mod codify_config;
mod config;
mod error;
pub mod inference;
mod language;
mod paths;
mod server;
pub mod session;
pub mod storage;

pub use auth::{AuthError, LoginPolicy};
pub use codify_config::{CodifyConfig, LoginConfig, LoginMode, ProviderConfig, UiConfig};
pub use config::ServerConfig;
pub use error::ApiError;
pub use inference::{ChatCompletionsClient, InferenceClient, ProviderError, UnconfiguredInference};
pub use language::{Language, LanguageCatalog};
pub use paths::{codify_config_path, codify_history_db_path, codify_home_dir};
pub use server::{build_router, build_router_with_sessions, SESSION_COOKIE};
pub use session::{SessionCommit, SessionError, SessionRegistry, SessionState, SessionView};
pub use storage::{HistoryRecord, HistoryStore, SqliteHistoryStore, StorageError};
