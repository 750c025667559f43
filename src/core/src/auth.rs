use thiserror::Error;

/// Credential check failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// How the login gate treats submitted credentials.
///
/// This is a UI gate, not a security boundary: the fixed pair lives in
/// plain config and the permissive modes accept anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginPolicy {
    /// Accept only one identity/secret pair.
    Fixed { identity: String, secret: String },
    /// Accept any submission where both fields are non-empty.
    NonEmpty,
    /// Accept every submission.
    AcceptAll,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self::Fixed {
            identity: "admin".to_string(),
            secret: "cyber2026".to_string(),
        }
    }
}

impl LoginPolicy {
    pub fn verify(&self, identity: &str, secret: &str) -> Result<(), AuthError> {
        let accepted = match self {
            Self::Fixed {
                identity: expected_identity,
                secret: expected_secret,
            } => identity == expected_identity && secret == expected_secret,
            Self::NonEmpty => !identity.trim().is_empty() && !secret.trim().is_empty(),
            Self::AcceptAll => true,
        };
        if accepted {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::NonEmpty => "non_empty",
            Self::AcceptAll => "accept_all",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_accepts_exact_pair() {
        let policy = LoginPolicy::default();
        assert!(policy.verify("admin", "cyber2026").is_ok());
    }

    #[test]
    fn fixed_rejects_wrong_secret() {
        let policy = LoginPolicy::default();
        assert_eq!(
            policy.verify("admin", "cyber2025"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn fixed_is_case_sensitive() {
        let policy = LoginPolicy::default();
        assert!(policy.verify("Admin", "cyber2026").is_err());
    }

    #[test]
    fn non_empty_requires_both_fields() {
        let policy = LoginPolicy::NonEmpty;
        assert!(policy.verify("neo", "x").is_ok());
        assert!(policy.verify("neo", "").is_err());
        assert!(policy.verify("  ", "x").is_err());
    }

    #[test]
    fn accept_all_accepts_blank() {
        assert!(LoginPolicy::AcceptAll.verify("", "").is_ok());
    }
}
