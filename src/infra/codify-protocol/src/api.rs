use serde::{Deserialize, Serialize};

use crate::Page;

/// Body of `POST /api/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub secret: String,
}

/// Body of `POST /api/navigate`.
///
/// The page is carried as a raw label so the server can reject unknown
/// targets with a structured error instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub page: String,
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Target language label, one of the advertised languages.
    pub language: String,
    /// Free-form task description, forwarded verbatim.
    pub task: String,
}

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub language: String,
    /// Highlighting hint for the rendered code block.
    pub syntax: String,
    pub code: String,
    /// File name offered by the download action.
    pub file_name: String,
}

/// One persisted query/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub code: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub records: Vec<HistoryEntry>,
}

/// A selectable target language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageOption {
    pub label: String,
    pub syntax: String,
    pub extension: String,
}

/// Content of the documentation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsResponse {
    pub engine: String,
    pub model: String,
    pub languages: Vec<LanguageOption>,
    pub history_records: u64,
}

/// What the client should render next.
///
/// Discriminated by `view`:
/// - `login`     — the only view reachable while unauthorized
/// - `generator` — task input and last result, plus the history sidebar
/// - `docs`      — documentation page plus the history sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewModel {
    Login,
    Generator(AuthorizedView),
    Docs(AuthorizedView),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedView {
    pub languages: Vec<LanguageOption>,
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_language: Option<String>,
}

impl ViewModel {
    pub fn page(&self) -> Option<Page> {
        match self {
            Self::Login => None,
            Self::Generator(_) => Some(Page::Generator),
            Self::Docs(_) => Some(Page::Docs),
        }
    }
}

/// Error payload returned with every non-2xx API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Short human-readable description.
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Well-known API error codes.
pub mod error_codes {
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const INVALID_PAGE: &str = "invalid_page";
    pub const INVALID_ARGUMENT: &str = "invalid_argument";
    pub const NOT_FOUND: &str = "not_found";
    pub const STORAGE_UNAVAILABLE: &str = "storage_unavailable";
    pub const PROVIDER_ERROR: &str = "provider_error";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_view_is_tagged() {
        let json_str = serde_json::to_string(&ViewModel::Login).unwrap();
        assert_eq!(json_str, r#"{"view":"login"}"#);
    }

    #[test]
    fn authorized_view_omits_missing_result() {
        let view = ViewModel::Docs(AuthorizedView {
            languages: vec![],
            history: vec![],
            last_result: None,
            selected_language: None,
        });
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["view"], "docs");
        assert!(value.get("last_result").is_none());
        assert_eq!(view.page(), Some(Page::Docs));
    }

    #[test]
    fn login_request_defaults_missing_fields() {
        let req: LoginRequest = serde_json::from_value(json!({ "identity": "admin" })).unwrap();
        assert_eq!(req.identity, "admin");
        assert!(req.secret.is_empty());
    }

    #[test]
    fn navigate_request_accepts_any_label() {
        let req: NavigateRequest = serde_json::from_value(json!({ "page": "settings" })).unwrap();
        assert_eq!(req.page, "settings");
    }
}
