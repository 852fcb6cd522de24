//! Resolved authentication state.

use serde::{Deserialize, Serialize};

use super::Session;

/// Which session endpoint vouched for the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Admin,
    Customer,
}

/// The merged outcome of a session probe cycle.
///
/// Derived, never persisted; recomputed whenever the cached entry expires.
/// The invariant `kind.is_some() == session.is_some()` is enforced by
/// construction: the fields are private and only the constructors below can
/// set them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthState {
    session: Option<Session>,
    kind: Option<SessionKind>,
    resolved: bool,
}

impl AuthState {
    /// A resolved, authenticated state.
    #[must_use]
    pub const fn authenticated(session: Session, kind: SessionKind) -> Self {
        Self {
            session: Some(session),
            kind: Some(kind),
            resolved: true,
        }
    }

    /// A resolved state with no session (both probes failed or denied).
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            session: None,
            kind: None,
            resolved: true,
        }
    }

    /// The state before any probe has completed.
    ///
    /// Never produced by [`SessionResolver`](crate::auth::SessionResolver):
    /// `resolve` always returns a resolved state, and the cache holds only
    /// resolved entries. This is the seed value for a consumer holding auth
    /// state ahead of a probe; the `resolved` field in the serialized form
    /// distinguishes "not yet checked" from "checked, anonymous".
    #[must_use]
    pub const fn unresolved() -> Self {
        Self {
            session: None,
            kind: None,
            resolved: false,
        }
    }

    /// The authenticated session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Which endpoint vouched for the session, if any.
    #[must_use]
    pub const fn kind(&self) -> Option<SessionKind> {
        self.kind
    }

    /// Whether a probe cycle has completed.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Whether a session is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftwell_core::{CustomerId, Role};

    fn session() -> Session {
        Session {
            subject_id: CustomerId::new("cust_1"),
            role: Role::Customer,
            email_verified: None,
            display_name: None,
        }
    }

    #[test]
    fn test_kind_present_iff_session_present() {
        let auth = AuthState::authenticated(session(), SessionKind::Customer);
        assert_eq!(auth.session().is_some(), auth.kind().is_some());

        let anon = AuthState::anonymous();
        assert_eq!(anon.session().is_some(), anon.kind().is_some());

        let unresolved = AuthState::unresolved();
        assert_eq!(unresolved.session().is_some(), unresolved.kind().is_some());
    }

    #[test]
    fn test_resolution_flags() {
        assert!(AuthState::anonymous().is_resolved());
        assert!(!AuthState::anonymous().is_authenticated());
        assert!(!AuthState::unresolved().is_resolved());
        assert!(AuthState::authenticated(session(), SessionKind::Admin).is_authenticated());
    }
}
