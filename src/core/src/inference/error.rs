use thiserror::Error;

/// Inference provider failures. None are retried.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing API key: set {env_var}")]
    MissingApiKey { env_var: String },

    #[error("failed to build http client: {0}")]
    Build(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected credentials (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("rate limited: {message}")]
    RateLimited { message: String },

    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Classify a non-2xx response by status code.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format_api_error(body);
        match status {
            401 | 403 => Self::Auth { status, message },
            429 => Self::RateLimited { message },
            _ => Self::Status { status, message },
        }
    }
}

/// Pull a readable message out of a provider error body.
///
/// Handles `{"error": {"message": ..., "code": ...}}`, `{"error": "..."}`
/// and `{"message": ...}`; anything else is returned trimmed.
pub fn format_api_error(body: &str) -> String {
    let trimmed = body.trim();
    let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return trimmed.to_string();
    };
    if let Some(error) = json.get("error") {
        if let Some(msg) = error.get("message").and_then(|v| v.as_str()) {
            return match error.get("code").and_then(|v| v.as_str()) {
                Some(code) => format!("{msg} (code: {code})"),
                None => msg.to_string(),
            };
        }
        if let Some(msg) = error.as_str() {
            return msg.to_string();
        }
    }
    if let Some(msg) = json.get("message").and_then(|v| v.as_str()) {
        return msg.to_string();
    }
    trimmed.to_string()
}
