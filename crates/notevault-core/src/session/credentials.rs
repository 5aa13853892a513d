//! The process-wide credential holder.

use parking_lot::RwLock;

use crate::error::Result;
use crate::models::{Session, User};
use crate::session::slot::CredentialSlot;

/// Token snapshot taken when a request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: Option<String>,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct CredentialState {
    session: Option<Session>,
    generation: u64,
}

/// Holds the current session and mirrors it into a `CredentialSlot`.
///
/// Every `set` and every effective `clear` bumps the generation, so work
/// started under one session can tell that the session has since changed.
/// Slot writes happen under the write lock to keep memory and storage in
/// the same order.
pub struct CredentialStore {
    state: RwLock<CredentialState>,
    slot: Box<dyn CredentialSlot>,
}

impl CredentialStore {
    pub fn new(slot: impl CredentialSlot + 'static) -> Self {
        Self {
            state: RwLock::new(CredentialState::default()),
            slot: Box::new(slot),
        }
    }

    /// Recover a persisted session into memory.
    ///
    /// The recovered token is not trusted yet; see
    /// `SessionController::bootstrap`.
    pub fn load(&self) -> Result<Option<Session>> {
        let recovered = self.slot.load()?;
        let mut state = self.state.write();
        if let Some(ref session) = recovered {
            log::debug!("recovered session for user {}", session.user.id);
            state.session = Some(session.clone());
            state.generation += 1;
        }
        Ok(recovered)
    }

    /// Current token, if any.
    pub fn get(&self) -> Option<String> {
        self.state.read().session.as_ref().map(|s| s.token.clone())
    }

    /// Token and generation read together.
    pub fn credential(&self) -> Credential {
        let state = self.state.read();
        Credential {
            token: state.session.as_ref().map(|s| s.token.clone()),
            generation: state.generation,
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.state.read().session.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().session.is_some()
    }

    /// Whether `generation` still names the live, authenticated session.
    pub fn is_current(&self, generation: u64) -> bool {
        let state = self.state.read();
        state.session.is_some() && state.generation == generation
    }

    /// Install a new session.
    ///
    /// A failed slot write leaves the session usable in memory for this
    /// process; the failure is logged, not returned.
    pub fn set(&self, token: impl Into<String>, user: User) -> Session {
        let session = Session::new(token, user);
        let mut state = self.state.write();
        state.session = Some(session.clone());
        state.generation += 1;
        if let Err(err) = self.slot.save(&session) {
            log::warn!("session not persisted: {}", err);
        }
        session
    }

    /// Replace the user record of the live session, keeping its token.
    pub fn update_user(&self, generation: u64, user: User) -> Option<Session> {
        let mut state = self.state.write();
        if state.generation != generation {
            return None;
        }
        let session = state.session.as_mut()?;
        session.user = user;
        let updated = session.clone();
        if let Err(err) = self.slot.save(&updated) {
            log::warn!("session not persisted: {}", err);
        }
        Some(updated)
    }

    /// Drop the session. Returns whether there was one.
    pub fn clear(&self) -> bool {
        let mut state = self.state.write();
        self.clear_locked(&mut state)
    }

    /// Drop the session only if it is still the one from `generation`.
    pub(crate) fn clear_if_current(&self, generation: u64) -> bool {
        let mut state = self.state.write();
        if state.generation != generation || state.session.is_none() {
            return false;
        }
        self.clear_locked(&mut state)
    }

    fn clear_locked(&self, state: &mut CredentialState) -> bool {
        let had_session = state.session.take().is_some();
        if had_session {
            state.generation += 1;
        }
        if let Err(err) = self.slot.clear() {
            log::warn!("stored session not removed: {}", err);
        }
        had_session
    }
}
