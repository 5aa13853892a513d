//! The single chokepoint for outbound requests.
//!
//! `HttpGateway` applies two policies around every exchange:
//!
//! - **Request**: attach the current token as a bearer credential, or send
//!   unauthenticated when there is none.
//! - **Response**: an unauthorized status on an authenticated request tears
//!   the session down before the error reaches the caller. Other failures
//!   are classified and passed through; nothing is retried.

mod http;
mod transport;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};
use crate::session::{CredentialStore, SessionInvalidator};

pub use http::HttpTransport;
pub use transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

const STATUS_UNAUTHORIZED: u16 = 401;
const STATUS_NOT_FOUND: u16 = 404;

/// A successful response together with the session generation it was
/// issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmed<T> {
    pub value: T,
    pub generation: u64,
}

impl<T> Confirmed<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Confirmed<U> {
        Confirmed {
            value: f(self.value),
            generation: self.generation,
        }
    }
}

/// Wraps a `Transport` with credential injection and failure policy.
#[derive(Clone)]
pub struct HttpGateway {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    invalidator: SessionInvalidator,
}

impl HttpGateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialStore>,
        invalidator: SessionInvalidator,
    ) -> Self {
        Self {
            transport,
            credentials,
            invalidator,
        }
    }

    /// Send a request and classify the response status.
    pub async fn send(&self, mut request: ApiRequest) -> Result<Confirmed<ApiResponse>> {
        let credential = self.credentials.credential();
        let authenticated = credential.token.is_some();
        request.bearer = credential.token;

        let method = request.method;
        let path = request.path.clone();
        log::debug!(
            "{} {} (authenticated: {})",
            method.as_str(),
            path,
            authenticated
        );

        let response = self.transport.send(request).await.map_err(|err| {
            log::debug!("{} {} failed: {}", method.as_str(), path, err);
            ClientError::Transport(err.to_string())
        })?;
        log::debug!("{} {} -> {}", method.as_str(), path, response.status);

        if response.is_success() {
            return Ok(Confirmed {
                value: response,
                generation: credential.generation,
            });
        }

        if response.status == STATUS_UNAUTHORIZED {
            if authenticated {
                let torn_down = self.invalidator.invalidate(credential.generation);
                if !torn_down && self.credentials.is_authenticated() {
                    // A newer session replaced the one this request used.
                    return Err(ClientError::Stale);
                }
                return Err(ClientError::AuthExpired);
            }
            // Nothing to tear down: wrong password on login, for example.
            return Err(ClientError::Rejected(
                error_message(&response.body).unwrap_or_else(|| "Invalid credentials".to_string()),
            ));
        }

        Err(classify_failure(&response))
    }

    /// Send a request and decode a JSON response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Confirmed<T>> {
        let confirmed = self.send(request).await?;
        let value = serde_json::from_slice::<T>(&confirmed.value.body)?;
        Ok(Confirmed {
            value,
            generation: confirmed.generation,
        })
    }

    /// Send a request whose response body is ignored (e.g. 204).
    pub async fn send_empty(&self, request: ApiRequest) -> Result<Confirmed<()>> {
        Ok(self.send(request).await?.map(|_| ()))
    }
}

fn classify_failure(response: &ApiResponse) -> ClientError {
    let message = error_message(&response.body);
    if response.status == STATUS_NOT_FOUND {
        ClientError::NotFound(message.unwrap_or_else(|| "Note not found".to_string()))
    } else if (400..500).contains(&response.status) {
        ClientError::Rejected(
            message.unwrap_or_else(|| format!("Request rejected (status {})", response.status)),
        )
    } else {
        let detail = match message {
            Some(message) => format!("HTTP {}: {}", response.status, message),
            None => format!("HTTP {}", response.status),
        };
        ClientError::Transport(detail)
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"message": ..}`, `{"error": ..}` and validator-style
/// `{"errors": [{"msg": ..}]}` bodies.
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let direct = ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()));
    if let Some(message) = direct {
        return Some(message.to_string());
    }
    value
        .get("errors")
        .and_then(|errors| errors.as_array())
        .and_then(|errors| errors.first())
        .and_then(|first| first.get("msg").or_else(|| first.get("message")))
        .and_then(|msg| msg.as_str())
        .map(str::to_string)
}
