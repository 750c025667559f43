use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::state::SessionState;

/// Session states keyed by the id carried in the session cookie.
///
/// Reads hand out copies. Transitions run inside [`SessionRegistry::update`]
/// against the stored value, so a handler never writes back a copy taken
/// before an await. Only sessions holding something worth keeping occupy
/// the map; blank ones are never inserted and are dropped when they
/// become blank again.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<Uuid, SessionState>>>,
}

/// Result of a committed [`SessionRegistry::update`].
#[derive(Debug, Clone)]
pub struct SessionCommit<T> {
    /// Id the session is stored under, `None` once it has been dropped.
    pub id: Option<Uuid>,
    /// The id was minted by this update.
    pub created: bool,
    pub state: SessionState,
    pub value: T,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionState>> {
        match self.inner.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Copy of the state for `id`; unknown or missing ids read as a fresh
    /// logged-out session without being stored.
    pub fn snapshot(&self, id: Option<Uuid>) -> SessionState {
        id.and_then(|id| self.lock().get(&id).cloned())
            .unwrap_or_else(SessionState::new)
    }

    /// Apply `f` to the current state for `id` under the lock.
    ///
    /// On `Err` nothing is stored. On `Ok` the result is stored, minting an
    /// id for a session not yet in the map, or removed if it is blank.
    pub fn update<T, E>(
        &self,
        id: Option<Uuid>,
        f: impl FnOnce(&mut SessionState) -> Result<T, E>,
    ) -> Result<SessionCommit<T>, E> {
        let mut sessions = self.lock();
        let known = id.filter(|id| sessions.contains_key(id));
        let mut state = known
            .and_then(|id| sessions.get(&id).cloned())
            .unwrap_or_else(SessionState::new);
        let value = f(&mut state)?;

        if state.is_blank() {
            if let Some(id) = known {
                sessions.remove(&id);
                tracing::debug!(session = %id, "session dropped");
            }
            return Ok(SessionCommit {
                id: None,
                created: false,
                state,
                value,
            });
        }

        let (id, created) = match known {
            Some(id) => (id, false),
            None => {
                let id = Uuid::new_v4();
                tracing::debug!(session = %id, "session created");
                (id, true)
            }
        };
        sessions.insert(id, state.clone());
        Ok(SessionCommit {
            id: Some(id),
            created,
            state,
            value,
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::auth::LoginPolicy;
    use crate::session::SessionError;

    fn login(registry: &SessionRegistry, id: Option<Uuid>) -> SessionCommit<()> {
        registry
            .update(id, |s| s.login(&LoginPolicy::AcceptAll, "", ""))
            .unwrap()
    }

    #[test]
    fn snapshot_does_not_insert() {
        let registry = SessionRegistry::new();
        let state = registry.snapshot(None);
        assert!(state.is_initialized());
        assert!(!state.is_authorized());
        let state = registry.snapshot(Some(Uuid::new_v4()));
        assert!(state.is_blank());
        assert!(registry.is_empty());
    }

    #[test]
    fn login_mints_session() {
        let registry = SessionRegistry::new();
        let commit = login(&registry, None);
        assert!(commit.created);
        let id = commit.id.unwrap();
        assert!(registry.snapshot(Some(id)).is_authorized());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_id_mints_new_session() {
        let registry = SessionRegistry::new();
        let stale = Uuid::new_v4();
        let commit = login(&registry, Some(stale));
        assert!(commit.created);
        assert_ne!(commit.id, Some(stale));
    }

    #[test]
    fn known_id_is_updated_in_place() {
        let registry = SessionRegistry::new();
        let id = login(&registry, None).id;
        let commit = registry
            .update(id, |s| s.navigate("docs"))
            .unwrap();
        assert_eq!(commit.id, id);
        assert!(!commit.created);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_update_stores_nothing() {
        let registry = SessionRegistry::new();
        let err = registry
            .update(None, |s| s.login(&LoginPolicy::default(), "admin", "nope"))
            .unwrap_err();
        assert!(matches!(err, SessionError::Auth(_)));
        assert!(registry.is_empty());

        let id = login(&registry, None).id;
        let err = registry.update(id, |s| s.navigate("settings")).unwrap_err();
        assert_eq!(err, SessionError::InvalidPage("settings".into()));
        assert!(registry.snapshot(id).is_authorized());
    }

    #[test]
    fn blank_session_is_dropped_on_logout() {
        let registry = SessionRegistry::new();
        let id = login(&registry, None).id;
        let commit = registry
            .update(id, |s| {
                s.logout();
                Ok::<_, Infallible>(())
            })
            .unwrap();
        assert_eq!(commit.id, None);
        assert!(registry.is_empty());
        assert!(!registry.snapshot(id).is_authorized());
    }

    #[test]
    fn logout_keeps_session_with_result() {
        let registry = SessionRegistry::new();
        let id = login(&registry, None).id;
        registry
            .update(id, |s| {
                s.record_result("x");
                s.logout();
                Ok::<_, Infallible>(())
            })
            .unwrap();
        let state = registry.snapshot(id);
        assert!(!state.is_authorized());
        assert_eq!(state.last_result(), Some("x"));
    }

    #[test]
    fn sessions_do_not_share_state() {
        let registry = SessionRegistry::new();
        let a = login(&registry, None).id;
        let b = login(&registry, None).id;
        registry
            .update(a, |s| {
                s.record_result("x");
                s.logout();
                Ok::<_, Infallible>(())
            })
            .unwrap();

        let state_b = registry.snapshot(b);
        assert!(state_b.is_authorized());
        assert_eq!(state_b.last_result(), None);
        assert_eq!(registry.len(), 2);
    }
}
