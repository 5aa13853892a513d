//! Debounced search driving `NotesRepository::list`.
//!
//! Each query change gets a sequence number and restarts a quiet-period
//! timer; only the timer that survives a burst of changes issues a request.
//! The list ticket is taken when the request is sent, so mutations
//! confirmed during the quiet period count as older than the search.
//! Requests that are already in flight are never cancelled: when an older
//! one lands after a newer one has been applied, the cache rejects it as
//! stale and no event is emitted.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ClientError;
use crate::models::Note;
use crate::notes::NotesRepository;

/// The most recent query and its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub text: String,
    pub seq: u64,
}

/// Outcome of a debounced search that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The collection now holds the results for `query`.
    Applied {
        seq: u64,
        query: String,
        notes: Vec<Note>,
    },
    /// The search failed; the previous collection is still in place.
    Failed {
        seq: u64,
        query: String,
        error: ClientError,
    },
}

impl SearchEvent {
    pub fn seq(&self) -> u64 {
        match self {
            SearchEvent::Applied { seq, .. } | SearchEvent::Failed { seq, .. } => *seq,
        }
    }

    pub fn query(&self) -> &str {
        match self {
            SearchEvent::Applied { query, .. } | SearchEvent::Failed { query, .. } => query,
        }
    }
}

#[derive(Default)]
struct CoordinatorState {
    last_seq: u64,
    pending: Option<PendingQuery>,
    timer: Option<JoinHandle<()>>,
}

/// Collapses bursts of query changes into single list requests.
///
/// Must be used from within a tokio runtime.
pub struct SearchCoordinator {
    repository: NotesRepository,
    debounce: Duration,
    state: Arc<Mutex<CoordinatorState>>,
    events: mpsc::UnboundedSender<SearchEvent>,
}

impl SearchCoordinator {
    pub fn new(
        repository: NotesRepository,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            repository,
            debounce,
            state: Arc::new(Mutex::new(CoordinatorState::default())),
            events,
        };
        (coordinator, rx)
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Record a new query and (re)start the quiet-period timer.
    ///
    /// Any timer that has not fired yet is cancelled. An empty string means
    /// "no filter". Returns the sequence number of this query.
    pub fn on_query_changed(&self, text: impl Into<String>) -> u64 {
        let mut state = self.state.lock();
        state.last_seq += 1;
        let query = PendingQuery {
            text: text.into(),
            seq: state.last_seq,
        };
        let seq = query.seq;

        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.pending = Some(query.clone());

        let repository = self.repository.clone();
        let events = self.events.clone();
        let debounce = self.debounce;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Detached so that a later abort of this timer cannot cancel a
            // request that is already on the wire.
            tokio::spawn(fetch(repository, query, events));
        }));
        seq
    }

    /// Fire the pending query now instead of waiting out the timer.
    ///
    /// Returns the spawned request, or `None` if nothing was pending.
    pub fn flush(&self) -> Option<JoinHandle<()>> {
        let mut state = self.state.lock();
        let timer = state.timer.take()?;
        if timer.is_finished() {
            return None;
        }
        timer.abort();
        let query = state.pending.clone()?;
        Some(tokio::spawn(fetch(
            self.repository.clone(),
            query,
            self.events.clone(),
        )))
    }

    /// Cancel a timer that has not fired yet.
    pub fn cancel(&self) {
        if let Some(timer) = self.state.lock().timer.take() {
            timer.abort();
        }
    }

    pub fn pending(&self) -> Option<PendingQuery> {
        self.state.lock().pending.clone()
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn fetch(
    repository: NotesRepository,
    query: PendingQuery,
    events: mpsc::UnboundedSender<SearchEvent>,
) {
    let PendingQuery { text, seq } = query;
    let event = match repository.list(&text).await {
        Ok(notes) => SearchEvent::Applied {
            seq,
            query: text,
            notes,
        },
        Err(ClientError::Stale) => {
            log::debug!("discarding stale search #{} ({:?})", seq, text);
            return;
        }
        Err(error) => SearchEvent::Failed {
            seq,
            query: text,
            error,
        },
    };
    // The receiver may be gone if the caller stopped listening.
    let _ = events.send(event);
}
