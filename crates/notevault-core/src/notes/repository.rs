//! CRUD against the remote notes resource.

use std::sync::Arc;

use crate::error::{ClientError, Result};
use crate::gateway::{ApiRequest, HttpGateway};
use crate::models::{Note, NoteDraft, NoteEnvelope, NotesEnvelope};
use crate::notes::cache::NotesCache;
use crate::session::CredentialStore;

/// Performs note operations through the gateway and keeps `NotesCache`
/// reconciled with the confirmed results.
///
/// Nothing is applied speculatively: the cache changes only once the
/// server has answered, and only if the session that sent the request is
/// still live.
#[derive(Clone)]
pub struct NotesRepository {
    gateway: HttpGateway,
    credentials: Arc<CredentialStore>,
    cache: Arc<NotesCache>,
}

impl NotesRepository {
    pub fn new(
        gateway: HttpGateway,
        credentials: Arc<CredentialStore>,
        cache: Arc<NotesCache>,
    ) -> Self {
        Self {
            gateway,
            credentials,
            cache,
        }
    }

    /// Snapshot of the cached collection, in server order.
    pub fn notes(&self) -> Vec<Note> {
        self.cache.snapshot()
    }

    pub fn find(&self, id: &str) -> Option<Note> {
        self.cache.find(id)
    }

    /// Fetch the notes matching `search` (empty = all) and replace the
    /// cached collection with them.
    ///
    /// On failure the previous collection is left as it was. Returns
    /// `ClientError::Stale` if a list issued later has already been applied.
    pub async fn list(&self, search: &str) -> Result<Vec<Note>> {
        self.require_session()?;
        let ticket = self.cache.issue_ticket();
        let request = ApiRequest::get("/notes").query("search", search);
        let confirmed = self.gateway.send_json::<NotesEnvelope>(request).await?;
        let generation = confirmed.generation;
        let applied = self.cache.replace_all(ticket, confirmed.value.notes, || {
            self.credentials.is_current(generation)
        })?;
        log::debug!(
            "applied list #{} ({} notes, search {:?})",
            ticket,
            applied.len(),
            search
        );
        Ok(applied)
    }

    /// Fetch a single note and refresh its cached copy.
    pub async fn get(&self, id: &str) -> Result<Note> {
        require_id(id)?;
        self.require_session()?;
        let confirmed = self
            .gateway
            .send_json::<NoteEnvelope>(ApiRequest::get(note_path(id)))
            .await?;
        let generation = confirmed.generation;
        let note = confirmed.value.note;
        self.cache
            .refresh(note.clone(), || self.credentials.is_current(generation))?;
        Ok(note)
    }

    /// Create a note. It enters the cache once the server has assigned it
    /// an id.
    pub async fn create(&self, draft: &NoteDraft) -> Result<Note> {
        validate_draft(draft)?;
        self.require_session()?;
        let request = ApiRequest::post("/notes").json(serde_json::to_value(draft)?);
        let confirmed = self.gateway.send_json::<NoteEnvelope>(request).await?;
        let generation = confirmed.generation;
        let note = confirmed.value.note;
        self.cache
            .insert_created(note.clone(), || self.credentials.is_current(generation))?;
        log::debug!("created note {}", note.id);
        Ok(note)
    }

    /// Replace a note's editable fields.
    ///
    /// The cached copy becomes the server's representation, which is
    /// authoritative for `updated_at`.
    pub async fn update(&self, id: &str, draft: &NoteDraft) -> Result<Note> {
        require_id(id)?;
        validate_draft(draft)?;
        self.require_session()?;
        let request = ApiRequest::put(note_path(id)).json(serde_json::to_value(draft)?);
        let confirmed = self.gateway.send_json::<NoteEnvelope>(request).await?;
        let generation = confirmed.generation;
        let note = confirmed.value.note;
        self.cache
            .replace_updated(note.clone(), || self.credentials.is_current(generation))?;
        log::debug!("updated note {}", note.id);
        Ok(note)
    }

    /// Delete a note. It stays cached until the server confirms.
    pub async fn delete(&self, id: &str) -> Result<()> {
        require_id(id)?;
        self.require_session()?;
        let confirmed = self
            .gateway
            .send_empty(ApiRequest::delete(note_path(id)))
            .await?;
        let generation = confirmed.generation;
        self.cache
            .remove_deleted(id, || self.credentials.is_current(generation))?;
        log::debug!("deleted note {}", id);
        Ok(())
    }

    fn require_session(&self) -> Result<()> {
        if self.credentials.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }
}

fn note_path(id: &str) -> String {
    format!("/notes/{}", id)
}

fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() || id.contains('/') {
        return Err(ClientError::Rejected(format!("Invalid note id: {:?}", id)));
    }
    Ok(())
}

fn validate_draft(draft: &NoteDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(ClientError::Rejected("Title is required".to_string()));
    }
    Ok(())
}
