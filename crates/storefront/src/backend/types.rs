//! Wire types for the account backend API.

use serde::{Deserialize, Serialize};

use giftwell_core::{CustomerId, Role};

use crate::models::Session;

/// Identity payload returned by both session endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityResponse {
    pub id: CustomerId,
    pub role: Role,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<IdentityResponse> for Session {
    fn from(identity: IdentityResponse) -> Self {
        Self {
            subject_id: identity.id,
            role: identity.role,
            email_verified: identity.email_verified,
            display_name: identity.display_name,
        }
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Fresh session token to hand back to the browser.
    pub token: String,
    /// Identity of the principal that just logged in.
    pub user: IdentityResponse,
}
