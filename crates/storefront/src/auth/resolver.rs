//! Session resolution against the backend's two session endpoints.

use std::time::Duration;

use tracing::{debug, instrument};

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::models::{AuthState, SessionKind, SessionToken};

/// Staleness window for resolved auth state: the next read after this
/// triggers a re-probe.
pub const AUTH_STATE_TTL: Duration = Duration::from_secs(5 * 60);

/// Resolved entries unread for this long are evicted.
pub const AUTH_STATE_TTI: Duration = Duration::from_secs(10 * 60);

/// Resolves a session token into an [`AuthState`].
///
/// Probe order is sequential, admin first, with short-circuit: a successful
/// admin probe settles the identity without contacting the customer
/// endpoint, so admin identity wins when both cookies happen to be valid.
/// Any admin probe failure - denial, transport error, or unparseable body -
/// falls through to the customer probe; the two failure shapes are treated
/// identically.
///
/// `resolve` never fails: when both probes fail the state degrades to
/// anonymous-but-resolved.
#[derive(Clone)]
pub struct SessionResolver {
    backend: BackendClient,
    cache: QueryCache<SessionToken, AuthState>,
}

impl SessionResolver {
    /// Create a resolver around an injected cache.
    ///
    /// The same cache handle is shared with [`AuthService`](super::AuthService)
    /// so mutations can seed and clear entries.
    #[must_use]
    pub const fn new(backend: BackendClient, cache: QueryCache<SessionToken, AuthState>) -> Self {
        Self { backend, cache }
    }

    /// Resolve the auth state behind a token, probing at most once per
    /// staleness window. Concurrent callers for one token share a single
    /// probe cycle.
    #[instrument(skip_all)]
    pub async fn resolve(&self, token: &SessionToken) -> AuthState {
        self.cache
            .get_with(token.clone(), self.probe(token))
            .await
    }

    async fn probe(&self, token: &SessionToken) -> AuthState {
        match self.backend.admin_identity(token).await {
            Ok(session) => {
                debug!("admin session endpoint vouched for token");
                return AuthState::authenticated(session, SessionKind::Admin);
            }
            Err(err) => {
                debug!(error = %err, "admin probe failed, trying customer endpoint");
            }
        }

        match self.backend.customer_identity(token).await {
            Ok(session) => {
                debug!("customer session endpoint vouched for token");
                AuthState::authenticated(session, SessionKind::Customer)
            }
            Err(err) => {
                debug!(error = %err, "customer probe failed, resolving as anonymous");
                AuthState::anonymous()
            }
        }
    }
}
