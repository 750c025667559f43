use codify_protocol::Page;
use thiserror::Error;

use crate::auth::{AuthError, LoginPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("invalid page: {0}")]
    InvalidPage(String),

    #[error("session is not authorized")]
    Unauthorized,
}

/// Which view a session is allowed to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView {
    LoggedOut,
    LoggedIn { page: Page },
}

/// Per-session navigation and auth flags.
///
/// A plain value: the registry hands out copies for reads and applies
/// transitions in place under its lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    initialized: bool,
    authorized: bool,
    current_page: Page,
    last_result: Option<String>,
    selected_language: Option<String>,
}

impl SessionState {
    /// A freshly initialized state.
    pub fn new() -> Self {
        let mut state = Self::default();
        state.initialize();
        state
    }

    /// Apply defaults once; later calls are no-ops.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.authorized = false;
        self.current_page = Page::Generator;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn current_page(&self) -> Page {
        self.current_page
    }

    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    pub fn selected_language(&self) -> Option<&str> {
        self.selected_language.as_deref()
    }

    /// Nothing worth keeping: logged out with no result to offer.
    pub fn is_blank(&self) -> bool {
        *self == Self::new()
    }

    pub fn view(&self) -> SessionView {
        if self.authorized {
            SessionView::LoggedIn {
                page: self.current_page,
            }
        } else {
            SessionView::LoggedOut
        }
    }

    pub fn login(
        &mut self,
        policy: &LoginPolicy,
        identity: &str,
        secret: &str,
    ) -> Result<(), SessionError> {
        self.initialize();
        policy.verify(identity, secret)?;
        if !self.authorized {
            self.current_page = Page::Generator;
        }
        self.authorized = true;
        Ok(())
    }

    /// Return to the login view. The last result survives.
    pub fn logout(&mut self) {
        self.initialize();
        self.authorized = false;
        self.current_page = Page::Generator;
    }

    pub fn navigate(&mut self, page: &str) -> Result<(), SessionError> {
        let page: Page = page
            .parse()
            .map_err(|_| SessionError::InvalidPage(page.to_string()))?;
        self.require_authorized()?;
        self.current_page = page;
        Ok(())
    }

    pub fn record_result(&mut self, text: impl Into<String>) {
        self.last_result = Some(text.into());
    }

    pub fn select_language(&mut self, label: impl Into<String>) {
        self.selected_language = Some(label.into());
    }

    pub fn require_authorized(&self) -> Result<(), SessionError> {
        if self.authorized {
            Ok(())
        } else {
            Err(SessionError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> SessionState {
        let mut state = SessionState::new();
        state.login(&LoginPolicy::AcceptAll, "", "").unwrap();
        state
    }

    #[test]
    fn initialize_sets_defaults() {
        let mut state = SessionState::default();
        assert!(!state.is_initialized());
        state.initialize();
        assert!(state.is_initialized());
        assert!(!state.is_authorized());
        assert_eq!(state.current_page(), Page::Generator);
        assert_eq!(state.view(), SessionView::LoggedOut);
    }

    #[test]
    fn initialize_is_idempotent() {
        let once = SessionState::new();
        let mut twice = SessionState::new();
        twice.initialize();
        assert_eq!(once, twice);
    }

    #[test]
    fn initialize_keeps_existing_values() {
        let mut state = logged_in();
        state.navigate("docs").unwrap();
        state.initialize();
        assert!(state.is_authorized());
        assert_eq!(state.current_page(), Page::Docs);
    }

    #[test]
    fn login_with_fixed_credentials() {
        let mut state = SessionState::new();
        state
            .login(&LoginPolicy::default(), "admin", "cyber2026")
            .unwrap();
        assert_eq!(
            state.view(),
            SessionView::LoggedIn {
                page: Page::Generator
            }
        );
    }

    #[test]
    fn failed_login_stays_logged_out() {
        let mut state = SessionState::new();
        let err = state
            .login(&LoginPolicy::default(), "admin", "wrong")
            .unwrap_err();
        assert_eq!(err, SessionError::Auth(AuthError::InvalidCredentials));
        assert_eq!(state.view(), SessionView::LoggedOut);
    }

    #[test]
    fn login_then_logout_returns_to_generator() {
        let mut state = logged_in();
        state.navigate("docs").unwrap();
        state.logout();
        assert_eq!(state.view(), SessionView::LoggedOut);
        assert_eq!(state.current_page(), Page::Generator);
    }

    #[test]
    fn logout_keeps_last_result() {
        let mut state = logged_in();
        state.record_result("print('hi')");
        state.logout();
        assert_eq!(state.last_result(), Some("print('hi')"));
    }

    #[test]
    fn navigate_between_pages() {
        let mut state = logged_in();
        state.navigate("docs").unwrap();
        assert_eq!(state.view(), SessionView::LoggedIn { page: Page::Docs });
        state.navigate("generator").unwrap();
        assert_eq!(
            state.view(),
            SessionView::LoggedIn {
                page: Page::Generator
            }
        );
    }

    #[test]
    fn navigate_unknown_page_leaves_state() {
        let mut state = logged_in();
        state.navigate("docs").unwrap();
        let before = state.clone();
        let err = state.navigate("settings").unwrap_err();
        assert_eq!(err, SessionError::InvalidPage("settings".into()));
        assert_eq!(state, before);
    }

    #[test]
    fn navigate_requires_login() {
        let mut state = SessionState::new();
        assert_eq!(state.navigate("docs"), Err(SessionError::Unauthorized));
        assert_eq!(state.current_page(), Page::Generator);
    }

    #[test]
    fn record_result_overwrites() {
        let mut state = logged_in();
        state.record_result("a");
        state.record_result("b");
        assert_eq!(state.last_result(), Some("b"));
    }

    #[test]
    fn blank_until_logged_in_or_holding_a_result() {
        let mut state = SessionState::new();
        assert!(state.is_blank());
        state.login(&LoginPolicy::AcceptAll, "", "").unwrap();
        assert!(!state.is_blank());
        state.logout();
        assert!(state.is_blank());

        state.record_result("x");
        assert!(!state.is_blank());
    }
}
