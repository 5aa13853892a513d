//! In-memory stand-in for the notes service.
//!
//! Implements `Transport`, so a `NotesClient` built over it exercises the
//! real gateway, session and cache code. Knobs let tests inject failures,
//! revoke tokens and hold responses to force out-of-order completion.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Notify;

use notevault_core::gateway::{ApiRequest, ApiResponse, Method, Transport, TransportError};
use notevault_core::session::MemorySlot;
use notevault_core::{ClientConfig, Note, NotesClient, User};

pub const PASSWORD: &str = "hunter22";
pub const DEBOUNCE: Duration = Duration::from_millis(500);

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct ServerState {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    notes: Vec<(String, Note)>,
    next_id: u64,
    injected: Vec<(Method, Result<ApiResponse, TransportError>)>,
}

#[derive(Default)]
pub struct FakeServer {
    state: Mutex<ServerState>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    parked: Mutex<HashMap<String, Arc<Notify>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A client over this server with an empty in-memory session slot.
    pub fn client(self: &Arc<Self>) -> NotesClient {
        self.client_with_slot(MemorySlot::new())
    }

    pub fn client_with_slot(self: &Arc<Self>, slot: MemorySlot) -> NotesClient {
        let config = ClientConfig::new()
            .base_url("http://fake.invalid/api")
            .debounce(DEBOUNCE);
        NotesClient::with_transport(config, self.clone(), slot)
    }

    pub fn add_account(&self, name: &str, email: &str, password: &str) -> User {
        let mut state = self.state.lock();
        state.next_id += 1;
        let user = User {
            id: format!("u{}", state.next_id),
            name: name.to_string(),
            email: email.to_string(),
        };
        state.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    /// Issue a token for an existing account without going through login.
    pub fn issue_token(&self, user: &User) -> String {
        let mut state = self.state.lock();
        state.next_id += 1;
        let token = format!("tok-{}", state.next_id);
        state.tokens.insert(token.clone(), user.id.clone());
        token
    }

    pub fn add_note(&self, owner: &User, title: &str, content: &str) -> String {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id.to_string();
        let note = Note {
            id: id.clone(),
            title: title.to_string(),
            content: content.to_string(),
            tags: Vec::new(),
            is_pinned: false,
            created_at: Some(Utc::now()),
            updated_at: Utc::now(),
        };
        state.notes.insert(0, (owner.id.clone(), note));
        id
    }

    /// Add a note with a fixed id (e.g. "42").
    pub fn add_note_with_id(&self, owner: &User, id: &str, title: &str) {
        let note = Note {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            tags: Vec::new(),
            is_pinned: false,
            created_at: Some(Utc::now()),
            updated_at: Utc::now(),
        };
        self.state.lock().notes.insert(0, (owner.id.clone(), note));
    }

    /// Server-side ids for a user, newest first.
    pub fn note_ids(&self, owner: &User) -> Vec<String> {
        self.state
            .lock()
            .notes
            .iter()
            .filter(|(uid, _)| uid == &owner.id)
            .map(|(_, note)| note.id.clone())
            .collect()
    }

    pub fn remove_note(&self, id: &str) {
        self.state.lock().notes.retain(|(_, note)| note.id != id);
    }

    pub fn revoke_all_tokens(&self) {
        self.state.lock().tokens.clear();
    }

    /// The next request with `method` gets this status and body instead of
    /// being routed.
    pub fn fail_next(&self, method: Method, status: u16, body: serde_json::Value) {
        self.state
            .lock()
            .injected
            .push((method, Ok(ApiResponse::json(status, &body))));
    }

    pub fn fail_next_transport(&self, method: Method) {
        self.state
            .lock()
            .injected
            .push((method, Err(TransportError::Connect("connection refused".into()))));
    }

    /// Delay the response for the next request matching `key` (see
    /// `hold_key`) until `release` is called. The response is computed
    /// before waiting, as if the server answered and the network was slow.
    /// Later requests with the same key are answered immediately.
    pub fn hold(&self, key: &str) {
        self.holds
            .lock()
            .insert(key.to_string(), Arc::new(Notify::new()));
    }

    /// Let a held response through, or disarm a hold nothing has hit yet.
    pub fn release(&self, key: &str) {
        if let Some(gate) = self.parked.lock().remove(key) {
            gate.notify_one();
        } else {
            self.holds.lock().remove(key);
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Search terms of every `GET /notes` received, in arrival order.
    pub fn list_calls(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == Method::Get && r.path == "/notes")
            .map(|r| r.query_value("search").unwrap_or_default().to_string())
            .collect()
    }

    /// Wait until at least `count` requests have arrived.
    pub async fn wait_for_requests(&self, count: usize) {
        while self.request_count() < count {
            tokio::task::yield_now().await;
        }
    }

    fn route(&self, request: &ApiRequest) -> ApiResponse {
        let mut state = self.state.lock();

        if let Some(pos) = state
            .injected
            .iter()
            .position(|(method, _)| *method == request.method)
        {
            if let (_, Ok(response)) = state.injected.remove(pos) {
                return response;
            }
        }

        let caller = request
            .bearer
            .as_ref()
            .and_then(|token| state.tokens.get(token).cloned());
        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        let body = request.body.clone().unwrap_or_else(|| json!({}));
        let field = |name: &str| body.get(name).and_then(|v| v.as_str()).unwrap_or("").to_string();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["auth", "register"]) => {
                let email = field("email");
                if state.accounts.iter().any(|a| a.user.email == email) {
                    return ApiResponse::json(400, &json!({ "message": "User already exists" }));
                }
                state.next_id += 1;
                let user = User {
                    id: format!("u{}", state.next_id),
                    name: field("name"),
                    email,
                };
                state.accounts.push(Account {
                    user: user.clone(),
                    password: field("password"),
                });
                let token = format!("tok-{}", state.next_id);
                state.tokens.insert(token.clone(), user.id.clone());
                ApiResponse::json(201, &json!({ "success": true, "token": token, "user": user }))
            }
            (Method::Post, ["auth", "login"]) => {
                let email = field("email");
                let password = field("password");
                let Some(user) = state
                    .accounts
                    .iter()
                    .find(|a| a.user.email == email && a.password == password)
                    .map(|a| a.user.clone())
                else {
                    return ApiResponse::json(401, &json!({ "message": "Invalid credentials" }));
                };
                state.next_id += 1;
                let token = format!("tok-{}", state.next_id);
                state.tokens.insert(token.clone(), user.id.clone());
                ApiResponse::json(200, &json!({ "token": token, "user": user }))
            }
            (_, _) if caller.is_none() => {
                ApiResponse::json(401, &json!({ "message": "Not authorized" }))
            }
            (Method::Get, ["auth", "me"]) => {
                let uid = caller.unwrap_or_default();
                let user = state
                    .accounts
                    .iter()
                    .find(|a| a.user.id == uid)
                    .map(|a| a.user.clone());
                ApiResponse::json(200, &json!({ "user": user }))
            }
            (Method::Get, ["notes"]) => {
                let uid = caller.unwrap_or_default();
                let term = request.query_value("search").unwrap_or("").to_lowercase();
                let notes: Vec<&Note> = state
                    .notes
                    .iter()
                    .filter(|(owner, _)| owner == &uid)
                    .map(|(_, note)| note)
                    .filter(|note| {
                        term.is_empty()
                            || note.title.to_lowercase().contains(&term)
                            || note.content.to_lowercase().contains(&term)
                    })
                    .collect();
                ApiResponse::json(200, &json!({ "success": true, "notes": notes }))
            }
            (Method::Get, ["notes", id]) => match find_note(&state, &caller, id) {
                Some(index) => {
                    ApiResponse::json(200, &json!({ "note": state.notes[index].1 }))
                }
                None => ApiResponse::json(404, &json!({ "message": "Note not found" })),
            },
            (Method::Post, ["notes"]) => {
                let title = field("title");
                if title.trim().is_empty() {
                    return ApiResponse::json(400, &json!({ "message": "Title is required" }));
                }
                state.next_id += 1;
                let note = Note {
                    id: state.next_id.to_string(),
                    title,
                    content: field("content"),
                    tags: tags_of(&body),
                    is_pinned: false,
                    created_at: Some(Utc::now()),
                    updated_at: Utc::now(),
                };
                state
                    .notes
                    .insert(0, (caller.unwrap_or_default(), note.clone()));
                ApiResponse::json(201, &json!({ "success": true, "data": note }))
            }
            (Method::Put, ["notes", id]) => {
                let Some(index) = find_note(&state, &caller, id) else {
                    return ApiResponse::json(404, &json!({ "message": "Note not found" }));
                };
                let (owner, mut note) = state.notes.remove(index);
                note.title = field("title");
                note.content = field("content");
                note.tags = tags_of(&body);
                note.updated_at = Utc::now() + chrono::Duration::seconds(1);
                state.notes.insert(0, (owner, note.clone()));
                ApiResponse::json(200, &json!({ "note": note }))
            }
            (Method::Delete, ["notes", id]) => {
                let Some(index) = find_note(&state, &caller, id) else {
                    return ApiResponse::json(404, &json!({ "message": "Note not found" }));
                };
                state.notes.remove(index);
                ApiResponse::no_content()
            }
            _ => ApiResponse::json(404, &json!({ "message": "Route not found" })),
        }
    }
}

fn find_note(state: &ServerState, caller: &Option<String>, id: &str) -> Option<usize> {
    let uid = caller.as_deref()?;
    state
        .notes
        .iter()
        .position(|(owner, note)| owner == uid && note.id == id)
}

fn tags_of(body: &serde_json::Value) -> Vec<String> {
    body.get("tags")
        .and_then(|v| v.as_array())
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Key used by `hold`: `"METHOD /path"`, with `?search=term` for lists.
pub fn hold_key(request: &ApiRequest) -> String {
    let mut key = format!("{} {}", request.method.as_str(), request.path);
    if let Some(term) = request.query_value("search") {
        key.push_str("?search=");
        key.push_str(term);
    }
    key
}

#[async_trait]
impl Transport for FakeServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().push(request.clone());

        {
            let mut state = self.state.lock();
            if let Some(pos) = state
                .injected
                .iter()
                .position(|(method, result)| *method == request.method && result.is_err())
            {
                let (_, result) = state.injected.remove(pos);
                return result;
            }
        }

        let response = self.route(&request);

        let key = hold_key(&request);
        let gate = self.holds.lock().remove(&key);
        if let Some(gate) = gate {
            self.parked.lock().insert(key, gate.clone());
            gate.notified().await;
        }
        Ok(response)
    }
}

/// A server with one account and a client signed in to it.
pub async fn signed_in() -> (Arc<FakeServer>, NotesClient, User) {
    let server = FakeServer::new();
    let user = server.add_account("Ada", "ada@example.com", PASSWORD);
    let client = server.client();
    let outcome = client.session().login("ada@example.com", PASSWORD).await;
    assert!(outcome.is_success(), "login failed: {:?}", outcome);
    (server, client, user)
}
