use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use codify_protocol::{error_codes, ErrorBody};
use thiserror::Error;

use crate::auth::AuthError;
use crate::inference::ProviderError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Everything an API handler can fail with.
///
/// Each variant ends the interaction; nothing is retried or partially
/// committed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Session(SessionError::Auth(_)) | Self::Session(SessionError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Session(SessionError::InvalidPage(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Session(SessionError::Auth(AuthError::InvalidCredentials)) => {
                error_codes::INVALID_CREDENTIALS
            }
            Self::Session(SessionError::Unauthorized) => error_codes::UNAUTHORIZED,
            Self::Session(SessionError::InvalidPage(_)) => error_codes::INVALID_PAGE,
            Self::Storage(StorageError::InvalidArgument(_)) | Self::InvalidArgument(_) => {
                error_codes::INVALID_ARGUMENT
            }
            Self::Storage(StorageError::Unavailable(_)) => error_codes::STORAGE_UNAVAILABLE,
            Self::Provider(_) => error_codes::PROVIDER_ERROR,
            Self::NotFound(_) => error_codes::NOT_FOUND,
            Self::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody::new(self.code(), self.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), code = self.code(), error = %self, "request failed");
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_is_401() {
        let err = ApiError::from(SessionError::Auth(AuthError::InvalidCredentials));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "invalid_credentials");
        assert_eq!(err.body().message, "invalid credentials");
    }

    #[test]
    fn invalid_page_is_400() {
        let err = ApiError::from(SessionError::InvalidPage("settings".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_page");
    }

    #[test]
    fn storage_errors_split_by_kind() {
        let unavailable = ApiError::from(StorageError::Unavailable("disk full".into()));
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        let invalid = ApiError::from(StorageError::InvalidArgument("limit".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.code(), "invalid_argument");
    }

    #[test]
    fn provider_error_is_bad_gateway() {
        let err = ApiError::from(ProviderError::Malformed("no choices".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "provider_error");
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn client_errors_are_logged_at_warn() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let response = ApiError::from(SessionError::Unauthorized).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("unauthorized"), "{output}");
    }
}
