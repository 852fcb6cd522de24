//! Credential mutations: login and logout.

use tracing::{instrument, warn};

use giftwell_core::Email;

use crate::backend::{BackendClient, BackendError};
use crate::cache::QueryCache;
use crate::models::{AuthState, SavedCard, Session, SessionKind, SessionToken};

use super::AuthError;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Fresh session token for the browser cookie.
    pub token: SessionToken,
    /// The seeded auth state.
    pub auth_state: AuthState,
    /// Role-specific landing route the client should navigate to.
    pub redirect_to: &'static str,
}

/// Login/logout operations over the account backend.
///
/// Holds handles to the same caches the read paths use, so mutations can
/// seed fresh values optimistically and flush user-scoped data.
#[derive(Clone)]
pub struct AuthService {
    backend: BackendClient,
    auth_cache: QueryCache<SessionToken, AuthState>,
    cards_cache: QueryCache<SessionToken, Vec<SavedCard>>,
}

impl AuthService {
    /// Create the service around injected caches.
    #[must_use]
    pub const fn new(
        backend: BackendClient,
        auth_cache: QueryCache<SessionToken, AuthState>,
        cards_cache: QueryCache<SessionToken, Vec<SavedCard>>,
    ) -> Self {
        Self {
            backend,
            auth_cache,
            cards_cache,
        }
    }

    /// Log in with email and password.
    ///
    /// On success the auth cache is seeded with the fresh session (no
    /// re-probe round trip) and `redirect_to` carries the role landing
    /// route.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the backend rejects
    /// the credentials; the message never distinguishes an unknown account
    /// from a wrong password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = Email::parse(email)?;

        let response = self
            .backend
            .login(&email, password)
            .await
            .map_err(|err| match err {
                BackendError::Unauthorized => AuthError::InvalidCredentials,
                other => AuthError::Backend(other),
            })?;

        let session: Session = response.user.into();
        let kind = if session.role.is_admin() {
            SessionKind::Admin
        } else {
            SessionKind::Customer
        };
        let redirect_to = session.role.landing_path();

        let token = SessionToken::new(response.token);
        let auth_state = AuthState::authenticated(session, kind);
        self.auth_cache.insert(token.clone(), auth_state.clone()).await;

        Ok(LoginOutcome {
            token,
            auth_state,
            redirect_to,
        })
    }

    /// Log out the session behind a token.
    ///
    /// Best-effort upstream: a failed backend call is logged and swallowed.
    /// Locally this always clears the token's auth state (so an immediate
    /// read sees no session without a network round trip) and flushes every
    /// cached card list, since that data is user-scoped.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &SessionToken) {
        if let Err(err) = self.backend.logout(token).await {
            warn!(error = %err, "backend logout failed, clearing local session anyway");
        }

        self.auth_cache
            .insert(token.clone(), AuthState::anonymous())
            .await;
        self.cards_cache.invalidate_all();
    }
}
