//! Session identity types.

use core::fmt;

use serde::{Deserialize, Serialize};

use giftwell_core::{CustomerId, Role};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "gw_session";

/// An opaque session token minted by the account backend.
///
/// Forwarded to the backend as the `gw_session` cookie on every probe and
/// mutation. Treated as a secret: `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value, for building the upstream cookie header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}

/// An authenticated identity, as reported by the account backend.
///
/// The backend owns the session lifecycle (creation on login, expiry); this
/// is a snapshot, never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend identifier of the principal.
    pub subject_id: CustomerId,
    /// Role reported by the backend.
    pub role: Role,
    /// Whether the account email is verified, when the backend reports it.
    pub email_verified: Option<bool>,
    /// Display name, when the backend reports it.
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("super-secret-value");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_session_deserializes_backend_shape() {
        let session: Session = serde_json::from_str(
            r#"{"subject_id":"cust_1","role":"user","email_verified":true,"display_name":"Ada"}"#,
        )
        .expect("deserialize");
        assert_eq!(session.role, Role::Customer);
        assert_eq!(session.subject_id.as_str(), "cust_1");
    }
}
