//! Login, registration, logout and start-up verification.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{ClientError, Result};
use crate::gateway::{ApiRequest, HttpGateway};
use crate::models::{LoginRequest, RegisterRequest, Session, TokenResponse, UserEnvelope};
use crate::session::credentials::CredentialStore;
use crate::session::invalidator::{AuthState, SessionInvalidator};

/// Result of a login or registration attempt.
///
/// Failures are values, not errors: the caller shows the message and
/// carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success(Session),
    Failure(String),
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            AuthOutcome::Success(_) => None,
            AuthOutcome::Failure(message) => Some(message),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthOutcome::Success(session) => Some(session),
            AuthOutcome::Failure(_) => None,
        }
    }
}

/// Owns the session lifecycle and publishes `AuthState` changes.
pub struct SessionController {
    gateway: HttpGateway,
    credentials: Arc<CredentialStore>,
    invalidator: SessionInvalidator,
}

impl SessionController {
    pub fn new(
        gateway: HttpGateway,
        credentials: Arc<CredentialStore>,
        invalidator: SessionInvalidator,
    ) -> Self {
        Self {
            gateway,
            credentials,
            invalidator,
        }
    }

    /// Create an account and sign in with it.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AuthOutcome {
        if [name, email, password].iter().any(|v| v.trim().is_empty()) {
            return AuthOutcome::Failure("Name, email and password are required".to_string());
        }
        let body = RegisterRequest {
            name: name.trim(),
            email: email.trim(),
            password,
        };
        match serde_json::to_value(&body) {
            Ok(body) => {
                self.authenticate(ApiRequest::post("/auth/register").json(body))
                    .await
            }
            Err(err) => AuthOutcome::Failure(format!("Could not encode request: {}", err)),
        }
    }

    /// Sign in with existing credentials.
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        if [email, password].iter().any(|v| v.trim().is_empty()) {
            return AuthOutcome::Failure("Email and password are required".to_string());
        }
        let body = LoginRequest {
            email: email.trim(),
            password,
        };
        match serde_json::to_value(&body) {
            Ok(body) => self.authenticate(ApiRequest::post("/auth/login").json(body)).await,
            Err(err) => AuthOutcome::Failure(format!("Could not encode request: {}", err)),
        }
    }

    /// Sign out locally. No server round-trip is needed.
    pub fn logout(&self) {
        self.invalidator.end_session();
    }

    pub fn current_user(&self) -> Option<Session> {
        self.credentials.current()
    }

    pub fn state(&self) -> AuthState {
        self.invalidator.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.invalidator.subscribe()
    }

    /// Restore a persisted session without asking the service.
    ///
    /// For short-lived callers that are about to make an authenticated
    /// request anyway: a revoked token surfaces as `AuthExpired` on that
    /// request and tears the session down then.
    pub fn restore(&self) -> Result<Option<Session>> {
        let recovered = self.credentials.load()?;
        let state = match &recovered {
            Some(session) => AuthState::Authenticated(session.user.clone()),
            None => AuthState::Unauthenticated,
        };
        self.invalidator.announce(state);
        Ok(recovered)
    }

    /// Restore a persisted session and confirm it with the service.
    ///
    /// The session is only reported as authenticated after `/auth/me`
    /// accepts the token; any failure signs out exactly like `logout`.
    pub async fn bootstrap(&self) -> AuthState {
        let recovered = match self.credentials.load() {
            Ok(recovered) => recovered,
            Err(err) => {
                log::warn!("discarding unreadable session: {}", err);
                self.logout();
                return AuthState::Unauthenticated;
            }
        };
        if recovered.is_none() {
            self.invalidator.announce(AuthState::Unauthenticated);
            return AuthState::Unauthenticated;
        }

        self.invalidator.announce(AuthState::Verifying);
        match self.fetch_current_user().await {
            Ok(session) => {
                log::info!("session verified for user {}", session.user.id);
                let state = AuthState::Authenticated(session.user);
                self.invalidator.announce(state.clone());
                state
            }
            Err(err) => {
                log::info!("stored session rejected: {}", err);
                self.logout();
                AuthState::Unauthenticated
            }
        }
    }

    /// Re-read the user record for the live session.
    pub async fn refresh_user(&self) -> Result<Session> {
        if !self.credentials.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }
        let session = self.fetch_current_user().await?;
        self.invalidator
            .announce(AuthState::Authenticated(session.user.clone()));
        Ok(session)
    }

    async fn fetch_current_user(&self) -> Result<Session> {
        let confirmed = self
            .gateway
            .send_json::<UserEnvelope>(ApiRequest::get("/auth/me"))
            .await?;
        self.credentials
            .update_user(confirmed.generation, confirmed.value.user)
            .ok_or(ClientError::Stale)
    }

    async fn authenticate(&self, request: ApiRequest) -> AuthOutcome {
        let path = request.path.clone();
        match self.gateway.send_json::<TokenResponse>(request).await {
            Ok(confirmed) => {
                let TokenResponse { token, user } = confirmed.value;
                if token.trim().is_empty() {
                    return AuthOutcome::Failure("Server returned an empty token".to_string());
                }
                // Switch generations first so late responses from the
                // previous session fail their liveness check, then drop
                // what that session cached.
                let session = self.credentials.set(token, user);
                self.invalidator.reset_scoped();
                log::info!("signed in as user {}", session.user.id);
                self.invalidator
                    .announce(AuthState::Authenticated(session.user.clone()));
                AuthOutcome::Success(session)
            }
            Err(err) => {
                log::debug!("{} failed: {}", path, err);
                AuthOutcome::Failure(err.user_message())
            }
        }
    }
}
