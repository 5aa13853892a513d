//! Wiring for a complete client.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::gateway::{HttpGateway, HttpTransport, Transport};
use crate::notes::{NotesCache, NotesRepository};
use crate::search::{SearchCoordinator, SearchEvent};
use crate::session::{CredentialSlot, CredentialStore, SessionController, SessionInvalidator};

/// One session, one notes collection, one gateway.
///
/// The gateway only holds the `SessionInvalidator`, so teardown on an
/// unauthorized response reaches the credential store and the notes cache
/// without the gateway knowing about either controller.
pub struct NotesClient {
    config: ClientConfig,
    credentials: Arc<CredentialStore>,
    session: SessionController,
    notes: NotesRepository,
}

impl NotesClient {
    /// Build a client that talks HTTP to `config.base_url`.
    pub fn new(config: ClientConfig, slot: impl CredentialSlot + 'static) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(config, transport, slot))
    }

    /// Build a client over any transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        slot: impl CredentialSlot + 'static,
    ) -> Self {
        let credentials = Arc::new(CredentialStore::new(slot));
        let invalidator = SessionInvalidator::new(credentials.clone());
        let cache = Arc::new(NotesCache::new());
        invalidator.register(cache.clone());

        let gateway = HttpGateway::new(transport, credentials.clone(), invalidator.clone());
        let session = SessionController::new(gateway.clone(), credentials.clone(), invalidator);
        let notes = NotesRepository::new(gateway, credentials.clone(), cache);

        Self {
            config,
            credentials,
            session,
            notes,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn notes(&self) -> &NotesRepository {
        &self.notes
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// A search coordinator over this client's notes, using the configured
    /// debounce window.
    pub fn search(&self) -> (SearchCoordinator, mpsc::UnboundedReceiver<SearchEvent>) {
        SearchCoordinator::new(self.notes.clone(), self.config.debounce)
    }
}
