//! Local view of the notes collection.
//!
//! The cache is only written after a server response resolves. Each write
//! runs a liveness check (is the session that issued the request still
//! current?) under the cache lock, so a teardown either happens before the
//! write and rejects it, or after it and wipes it.
//!
//! List responses are ordered by query ticket: a response for an older
//! ticket than the last applied list is stale. Confirmed updates and
//! deletes are kept as overlays stamped with the ticket counter at commit
//! time; a list issued before the commit gets the overlay applied on top,
//! so it cannot bring back a deleted note or roll back an update. Creates
//! get no overlay: a list answers for its own query, and the next list
//! picks the new note up if it matches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::{ClientError, Result};
use crate::models::Note;
use crate::session::SessionScoped;

/// Upper bound on remembered mutations while lists keep failing.
const MAX_OVERLAYS: usize = 256;

#[derive(Debug, Clone)]
enum Overlay {
    Replaced(Note),
    Deleted,
}

#[derive(Debug, Default)]
struct CacheState {
    notes: Vec<Note>,
    last_applied_ticket: u64,
    overlays: HashMap<String, (u64, Overlay)>,
}

/// Reconciled, duplicate-free collection of cached notes.
#[derive(Debug, Default)]
pub struct NotesCache {
    state: Mutex<CacheState>,
    tickets: AtomicU64,
}

impl NotesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next query ticket. Tickets start at 1 and only grow.
    pub fn issue_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn snapshot(&self) -> Vec<Note> {
        self.state.lock().notes.clone()
    }

    pub fn find(&self, id: &str) -> Option<Note> {
        self.state.lock().notes.iter().find(|n| n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole collection with a list response.
    pub(crate) fn replace_all(
        &self,
        ticket: u64,
        notes: Vec<Note>,
        still_current: impl FnOnce() -> bool,
    ) -> Result<Vec<Note>> {
        let mut state = self.state.lock();
        if !still_current() || ticket <= state.last_applied_ticket {
            return Err(ClientError::Stale);
        }

        let mut merged: Vec<Note> = Vec::with_capacity(notes.len());
        for note in notes {
            if !merged.iter().any(|existing| existing.id == note.id) {
                merged.push(note);
            }
        }

        // Mutations confirmed after this list was issued win over it.
        state.overlays.retain(|_, (watermark, _)| *watermark >= ticket);
        for (id, (_, overlay)) in state.overlays.iter() {
            match overlay {
                Overlay::Deleted => merged.retain(|note| &note.id != id),
                Overlay::Replaced(updated) => {
                    if let Some(slot) = merged.iter_mut().find(|note| &note.id == id) {
                        *slot = updated.clone();
                    }
                }
            }
        }

        state.last_applied_ticket = ticket;
        state.notes = merged;
        Ok(state.notes.clone())
    }

    /// Add a newly created note at the front.
    pub(crate) fn insert_created(
        &self,
        note: Note,
        still_current: impl FnOnce() -> bool,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !still_current() {
            return Err(ClientError::Stale);
        }
        state.notes.retain(|existing| existing.id != note.id);
        state.notes.insert(0, note);
        Ok(())
    }

    /// Swap in the server's representation of an updated note.
    ///
    /// Notes outside the current view stay outside it.
    pub(crate) fn replace_updated(
        &self,
        note: Note,
        still_current: impl FnOnce() -> bool,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !still_current() {
            return Err(ClientError::Stale);
        }
        if let Some(slot) = state.notes.iter_mut().find(|n| n.id == note.id) {
            *slot = note.clone();
        }
        self.record(&mut state, note.id.clone(), Overlay::Replaced(note));
        Ok(())
    }

    /// Refresh a cached copy after a single-note read, without recording an
    /// overlay.
    pub(crate) fn refresh(&self, note: Note, still_current: impl FnOnce() -> bool) -> Result<()> {
        let mut state = self.state.lock();
        if !still_current() {
            return Err(ClientError::Stale);
        }
        if let Some(slot) = state.notes.iter_mut().find(|n| n.id == note.id) {
            *slot = note;
        }
        Ok(())
    }

    /// Drop a note the server confirmed deleted.
    pub(crate) fn remove_deleted(
        &self,
        id: &str,
        still_current: impl FnOnce() -> bool,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !still_current() {
            return Err(ClientError::Stale);
        }
        state.notes.retain(|note| note.id != id);
        self.record(&mut state, id.to_string(), Overlay::Deleted);
        Ok(())
    }

    /// Remember a confirmed mutation for lists still in flight.
    ///
    /// Only lists with a ticket above `last_applied_ticket` can still land,
    /// so overlays at or below it are dropped.
    fn record(&self, state: &mut CacheState, id: String, overlay: Overlay) {
        let watermark = self.tickets.load(Ordering::SeqCst);
        state.overlays.insert(id, (watermark, overlay));

        let floor = state.last_applied_ticket;
        state.overlays.retain(|_, (watermark, _)| *watermark > floor);
        while state.overlays.len() > MAX_OVERLAYS {
            let oldest = state
                .overlays
                .iter()
                .min_by_key(|(_, (watermark, _))| *watermark)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => state.overlays.remove(&id),
                None => break,
            };
        }
    }
}

impl SessionScoped for NotesCache {
    fn reset(&self) {
        let mut state = self.state.lock();
        state.notes.clear();
        state.overlays.clear();
        // Lists issued under the old session must not land afterwards.
        state.last_applied_ticket = self.tickets.load(Ordering::SeqCst);
    }
}
