//! Session state: the credential, its persistence, teardown and the
//! controller that drives login, registration and logout.

mod controller;
mod credentials;
mod invalidator;
mod slot;

pub use controller::{AuthOutcome, SessionController};
pub use credentials::{Credential, CredentialStore};
pub use invalidator::{AuthState, SessionInvalidator, SessionScoped};
pub use slot::{CredentialSlot, FileSlot, MemorySlot};
