//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{AUTH_STATE_TTI, AUTH_STATE_TTL, AuthService, SessionResolver};
use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::cards::CardsService;
use crate::config::StorefrontConfig;
use crate::square::SquareClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like upstream clients and configuration.
///
/// The resolver, auth service, and cards service are wired over shared
/// cache handles: one auth-state cache feeds both the resolver (read
/// path) and the auth service (seed on login, clear on logout), and one
/// cards cache feeds both the cards service and the logout flush.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    resolver: SessionResolver,
    auth: AuthService,
    cards: CardsService,
    square: SquareClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = BackendClient::new(&config.backend);
        let square = SquareClient::new(&config.square);

        let auth_cache = QueryCache::new(AUTH_STATE_TTL, AUTH_STATE_TTI, 10_000);
        let cards_cache = QueryCache::new(AUTH_STATE_TTL, AUTH_STATE_TTI, 10_000);

        let resolver = SessionResolver::new(backend.clone(), auth_cache.clone());
        let auth = AuthService::new(backend.clone(), auth_cache, cards_cache.clone());
        let cards = CardsService::new(backend.clone(), cards_cache);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                resolver,
                auth,
                cards,
                square,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the account backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the session resolver.
    #[must_use]
    pub fn resolver(&self) -> &SessionResolver {
        &self.inner.resolver
    }

    /// Get a reference to the auth service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the saved cards service.
    #[must_use]
    pub fn cards(&self) -> &CardsService {
        &self.inner.cards
    }

    /// Get a reference to the Square client.
    #[must_use]
    pub fn square(&self) -> &SquareClient {
        &self.inner.square
    }
}
