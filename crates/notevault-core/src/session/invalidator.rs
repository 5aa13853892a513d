//! Session teardown capability and auth-state broadcast.
//!
//! The gateway needs to end the session from deep inside a failed request
//! without holding the whole `SessionController`. `SessionInvalidator` is
//! that narrow handle: it can clear the credential, reset state derived
//! from the session, and tell observers the session is gone.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::models::User;
use crate::session::credentials::CredentialStore;

/// Authentication state as seen by observers (views, routing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No session; the login entry point should be shown.
    Unauthenticated,
    /// A recovered token is being checked against the service.
    Verifying,
    /// A confirmed session for this user.
    Authenticated(User),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// State that only makes sense while a session is live.
pub trait SessionScoped: Send + Sync {
    /// Discard everything derived from the ended session.
    fn reset(&self);
}

/// Clonable handle that tears the session down.
#[derive(Clone)]
pub struct SessionInvalidator {
    credentials: Arc<CredentialStore>,
    scoped: Arc<RwLock<Vec<Arc<dyn SessionScoped>>>>,
    state_tx: Arc<watch::Sender<AuthState>>,
}

impl SessionInvalidator {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Unauthenticated);
        Self {
            credentials,
            scoped: Arc::new(RwLock::new(Vec::new())),
            state_tx: Arc::new(state_tx),
        }
    }

    /// Register state to be reset on every teardown.
    pub fn register(&self, scoped: Arc<dyn SessionScoped>) {
        self.scoped.write().push(scoped);
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// Tear down the session that was live at `generation`.
    ///
    /// Only the first call for a given session has an effect, so concurrent
    /// unauthorized responses collapse into one teardown, and a late 401
    /// from an old session cannot end a newer one. Returns whether this
    /// call performed the teardown.
    pub fn invalidate(&self, generation: u64) -> bool {
        if !self.credentials.clear_if_current(generation) {
            log::debug!("ignoring stale invalidation for generation {}", generation);
            return false;
        }
        log::warn!("session rejected by server, signing out");
        self.reset_scoped();
        self.announce(AuthState::Unauthenticated);
        true
    }

    /// Unconditional local sign-out.
    pub(crate) fn end_session(&self) {
        if self.credentials.clear() {
            log::info!("signed out");
        }
        self.reset_scoped();
        self.announce(AuthState::Unauthenticated);
    }

    pub(crate) fn announce(&self, state: AuthState) {
        self.state_tx.send_replace(state);
    }

    pub(crate) fn reset_scoped(&self) {
        for scoped in self.scoped.read().iter() {
            scoped.reset();
        }
    }
}
