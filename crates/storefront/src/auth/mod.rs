//! Authentication: session resolution and credential mutations.
//!
//! Two pieces live here:
//!
//! - [`SessionResolver`] - probes the backend's two session endpoints and
//!   merges the outcome into a single [`AuthState`](crate::models::AuthState),
//!   cached per token.
//! - [`AuthService`] - login/logout. Login seeds the resolver's cache and
//!   picks the role landing route; logout clears local state even when the
//!   backend call fails.

mod resolver;
mod service;

pub use resolver::{AUTH_STATE_TTI, AUTH_STATE_TTL, SessionResolver};
pub use service::{AuthService, LoginOutcome};

use thiserror::Error;

use giftwell_core::EmailError;

use crate::backend::BackendError;

/// Errors that can occur during credential mutations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The backend rejected the credentials. Deliberately does not say
    /// whether the account exists.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Backend request failed for a non-credential reason.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}
