//! Session guard.
//!
//! [`SessionGuard`] owns the process-wide [`SessionState`]. Calls that need
//! a credential go through [`SessionGuard::authorized`], which attaches the
//! current credential and reacts to the server's verdict: a 401 clears the
//! session (memory and storage) and announces [`SessionSignal::LoginRequired`];
//! a 403 leaves the session alone.

use std::future::Future;
use std::sync::Arc;

use feed_core::{classify_status, Credential, ResponseClass, SessionState};
use feed_types::LoginRequest;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::error::ClientError;
use crate::store::SessionStore;
use crate::transport::{ApiError, FeedApi};

/// Session changes announced to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// A login succeeded.
    LoggedIn {
        /// The subject id.
        subject_id: String,
    },
    /// The user logged out.
    LoggedOut,
    /// The server rejected the session; the front end should send the user
    /// to its login entry point.
    LoginRequired,
}

/// Owns the session and mediates every authenticated call.
pub struct SessionGuard<A> {
    api: Arc<A>,
    store: Arc<dyn SessionStore>,
    state: Mutex<SessionState>,
    signals: broadcast::Sender<SessionSignal>,
}

impl<A: FeedApi> SessionGuard<A> {
    /// Restore the stored session, or start anonymous.
    ///
    /// An unreadable stored session is discarded with a warning.
    pub async fn init(api: Arc<A>, store: Arc<dyn SessionStore>) -> Self {
        let state = match store.load().await {
            Ok(Some(state)) => state,
            Ok(None) => SessionState::anonymous(),
            Err(e) => {
                warn!(error = %e, "discarding unreadable session");
                if let Err(e) = store.clear().await {
                    warn!(error = %e, "failed to remove unreadable session");
                }
                SessionState::anonymous()
            }
        };
        let (signals, _) = broadcast::channel(16);
        Self {
            api,
            store,
            state: Mutex::new(state),
            signals,
        }
    }

    /// The API this guard mediates.
    pub fn api(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.signals.subscribe()
    }

    /// Log in and persist the session.
    ///
    /// Fails with [`ClientError::Auth`] on bad credentials or an unreachable
    /// server. A failed login leaves the current session untouched.
    pub async fn login(&self, id: &str, password: &str) -> Result<SessionState, ClientError> {
        let request = LoginRequest::new(id, password);
        let response = self.api.login(&request).await.map_err(|e| match e {
            ApiError::Unreachable(reason) => ClientError::Auth {
                reason: format!("server unreachable: {}", reason),
            },
            other => match ClientError::from(other) {
                ClientError::Authz => ClientError::Auth {
                    reason: "login refused".into(),
                },
                mapped => mapped,
            },
        })?;

        let state = SessionState::from_login(response).map_err(|e| ClientError::Auth {
            reason: e.to_string(),
        })?;
        self.store.save(&state).await?;
        *self.state.lock().await = state.clone();

        let subject_id = state.subject_id().unwrap_or_default().to_string();
        info!(subject = %subject_id, "logged in");
        let _ = self.signals.send(SessionSignal::LoggedIn { subject_id });
        Ok(state)
    }

    /// Clear the session in storage, then in memory. If storage fails the
    /// session is left as it was.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.store.clear().await?;
        self.state.lock().await.clear();
        info!("logged out");
        let _ = self.signals.send(SessionSignal::LoggedOut);
        Ok(())
    }

    /// Check whether the current subject holds a role.
    pub async fn has_role(&self, role: &str) -> bool {
        self.state.lock().await.has_role(role)
    }

    /// Check whether a credential is present.
    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.is_authenticated()
    }

    /// A copy of the current session.
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// The current credential, if any.
    pub async fn credential(&self) -> Option<Credential> {
        self.state.lock().await.credential().cloned()
    }

    /// Run a call with the current credential and react to its outcome.
    ///
    /// Nothing is retried.
    pub async fn authorized<R, F, Fut>(&self, call: F) -> Result<R, ClientError>
    where
        F: FnOnce(Option<Credential>) -> Fut,
        Fut: Future<Output = Result<R, ApiError>>,
    {
        let credential = self.credential().await;
        match call(credential).await {
            Ok(value) => Ok(value),
            Err(err) => Err(self.react(err).await),
        }
    }

    async fn react(&self, err: ApiError) -> ClientError {
        if let ApiError::Status { status, .. } = &err {
            if classify_status(*status) == ResponseClass::Unauthorized {
                self.expire().await;
            }
        }
        ClientError::from(err)
    }

    async fn expire(&self) {
        warn!("server rejected the session; clearing it");
        if let Err(e) = self.store.clear().await {
            // An anonymous document keeps the rejected credential from
            // coming back on the next start.
            warn!(error = %e, "failed to remove stored session; overwriting it");
            if let Err(e) = self.store.save(&SessionState::anonymous()).await {
                warn!(error = %e, "failed to overwrite stored session");
            }
        }
        self.state.lock().await.clear();
        let _ = self.signals.send(SessionSignal::LoginRequired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemorySessionStore, StoreError};
    use crate::transport::{Call, MockApi};
    use async_trait::async_trait;
    use feed_types::ItemId;

    /// A store whose file cannot be removed.
    #[derive(Clone)]
    struct UndeletableStore(MemorySessionStore);

    #[async_trait]
    impl SessionStore for UndeletableStore {
        async fn load(&self) -> Result<Option<SessionState>, StoreError> {
            self.0.load().await
        }

        async fn save(&self, state: &SessionState) -> Result<(), StoreError> {
            self.0.save(state).await
        }

        async fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    async fn guard(api: &MockApi, store: &MemorySessionStore) -> SessionGuard<MockApi> {
        SessionGuard::init(Arc::new(api.clone()), Arc::new(store.clone())).await
    }

    fn unauthorized() -> ApiError {
        ApiError::Status {
            status: 401,
            message: None,
        }
    }

    #[tokio::test]
    async fn starts_from_stored_session() {
        let api = MockApi::new();
        let store = MemorySessionStore::with_state(SessionState::authenticated(
            Credential::new("t"),
            "admin",
            ["ADMIN"],
        ));
        let guard = guard(&api, &store).await;

        assert!(guard.is_authenticated().await);
        assert!(guard.has_role("ADMIN").await);
    }

    #[tokio::test]
    async fn login_persists_and_signals() {
        let api = MockApi::new();
        api.add_account("admin", "pw", &["ROLE_ADMIN", "USER"]);
        let store = MemorySessionStore::new();
        let guard = guard(&api, &store).await;
        let mut signals = guard.subscribe();

        let state = guard.login("admin", "pw").await.unwrap();
        assert!(state.has_role("ADMIN"));
        assert_eq!(store.snapshot(), Some(state));
        assert_eq!(
            signals.recv().await.unwrap(),
            SessionSignal::LoggedIn {
                subject_id: "admin".into()
            }
        );
    }

    #[tokio::test]
    async fn bad_password_is_auth_error() {
        let api = MockApi::new();
        api.add_account("admin", "pw", &["ADMIN"]);
        let store = MemorySessionStore::new();
        let guard = guard(&api, &store).await;

        let err = guard.login("admin", "wrong").await.unwrap_err();
        assert!(matches!(err, ClientError::Auth { .. }));
        assert!(!guard.is_authenticated().await);
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn unreachable_login_is_auth_error() {
        let api = MockApi::new();
        api.fail_next(ApiError::Unreachable("connection refused".into()));
        let guard = guard(&api, &MemorySessionStore::new()).await;

        let err = guard.login("admin", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Auth { reason } if reason.contains("unreachable")));
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let api = MockApi::new();
        api.add_account("admin", "pw", &["ADMIN"]);
        let store = MemorySessionStore::new();
        let guard = guard(&api, &store).await;
        guard.login("admin", "pw").await.unwrap();
        let mut signals = guard.subscribe();

        guard.logout().await.unwrap();
        assert!(!guard.is_authenticated().await);
        assert!(!guard.has_role("ADMIN").await);
        assert!(store.snapshot().is_none());
        assert_eq!(signals.recv().await.unwrap(), SessionSignal::LoggedOut);
    }

    #[tokio::test]
    async fn authorized_attaches_credential() {
        let api = MockApi::new();
        api.add_account("admin", "pw", &["ADMIN"]);
        let guard = guard(&api, &MemorySessionStore::new()).await;
        guard.login("admin", "pw").await.unwrap();

        let inner = guard.api();
        guard
            .authorized(|credential| async move {
                inner.fetch_comments(ItemId::new(3), credential.as_ref()).await
            })
            .await
            .unwrap();

        let last = api.calls().pop().unwrap();
        assert_eq!(last.call, Call::Comments(ItemId::new(3)));
        assert_eq!(last.bearer.as_deref(), Some("token-admin"));
    }

    #[tokio::test]
    async fn unauthorized_response_expires_session() {
        let api = MockApi::new();
        api.add_account("admin", "pw", &["ADMIN"]);
        let store = MemorySessionStore::new();
        let guard = guard(&api, &store).await;
        guard.login("admin", "pw").await.unwrap();
        let mut signals = guard.subscribe();

        api.fail_next(unauthorized());
        let inner = guard.api();
        let err = guard
            .authorized(|credential| async move {
                inner.fetch_comments(ItemId::new(3), credential.as_ref()).await
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Auth { .. }));
        assert!(!guard.is_authenticated().await);
        assert!(store.snapshot().is_none());
        assert_eq!(signals.recv().await.unwrap(), SessionSignal::LoginRequired);
    }

    #[tokio::test]
    async fn forbidden_response_keeps_session() {
        let api = MockApi::new();
        api.add_account("user", "pw", &["USER"]);
        let guard = guard(&api, &MemorySessionStore::new()).await;
        guard.login("user", "pw").await.unwrap();

        api.fail_next(ApiError::Status {
            status: 403,
            message: None,
        });
        let inner = guard.api();
        let err = guard
            .authorized(|credential| async move {
                inner.fetch_comments(ItemId::new(3), credential.as_ref()).await
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Authz));
        assert!(guard.is_authenticated().await);
    }

    #[tokio::test]
    async fn corrupt_stored_session_starts_anonymous() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("session.json"), "{oops").unwrap();
        let store = crate::store::FileSessionStore::new(dir.path());

        let guard = SessionGuard::init(Arc::new(MockApi::new()), Arc::new(store.clone())).await;
        assert!(!guard.is_authenticated().await);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn failed_logout_keeps_session() {
        let api = MockApi::new();
        api.add_account("admin", "pw", &["ADMIN"]);
        let store = UndeletableStore(MemorySessionStore::new());
        let guard = SessionGuard::init(Arc::new(api.clone()), Arc::new(store.clone())).await;
        guard.login("admin", "pw").await.unwrap();

        let err = guard.logout().await.unwrap_err();
        assert!(matches!(err, ClientError::Store(_)));
        // Memory still agrees with what the next start would load
        assert!(guard.is_authenticated().await);
        assert!(store.0.snapshot().unwrap().is_authenticated());
    }

    #[tokio::test]
    async fn rejected_session_does_not_return_on_restart() {
        let api = MockApi::new();
        api.add_account("admin", "pw", &["ADMIN"]);
        let store = UndeletableStore(MemorySessionStore::new());
        let guard = SessionGuard::init(Arc::new(api.clone()), Arc::new(store.clone())).await;
        guard.login("admin", "pw").await.unwrap();
        let mut signals = guard.subscribe();

        api.fail_next(unauthorized());
        let inner = guard.api();
        let _ = guard
            .authorized(|credential| async move {
                inner.fetch_comments(ItemId::new(3), credential.as_ref()).await
            })
            .await;
        assert_eq!(signals.recv().await.unwrap(), SessionSignal::LoginRequired);
        assert!(!guard.is_authenticated().await);

        let restarted = SessionGuard::init(Arc::new(api.clone()), Arc::new(store)).await;
        assert!(!restarted.is_authenticated().await);
    }
}
