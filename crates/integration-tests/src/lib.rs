//! Integration tests for Giftwell.
//!
//! Each test spins up in-process fake upstreams (the account backend and the
//! Square API) on ephemeral ports, points a real storefront at them, and
//! drives it over HTTP with `reqwest`. No external services, no shared
//! state: every test owns its own servers.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p giftwell-integration-tests
//! ```

// Test-support crate: panicking on broken fixtures is the desired behavior.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

pub mod fake_backend;
pub mod fake_square;

use std::net::{IpAddr, Ipv4Addr};

use axum::Router;
use secrecy::SecretString;
use url::Url;

use giftwell_storefront::config::{
    BackendConfig, SquareConfig, SquareEnvironment, StorefrontConfig,
};
use giftwell_storefront::routes;
use giftwell_storefront::state::AppState;

use fake_backend::FakeBackend;
use fake_square::FakeSquare;

/// A running storefront wired to fresh fake upstreams.
pub struct TestContext {
    /// Cookie-keeping HTTP client.
    pub client: reqwest::Client,
    /// Base URL of the storefront under test.
    pub base_url: String,
    pub backend: FakeBackend,
    pub square: FakeSquare,
}

impl TestContext {
    /// Start fake upstreams and a storefront pointed at them.
    pub async fn start() -> Self {
        let backend = FakeBackend::spawn().await;
        let square = FakeSquare::spawn().await;

        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            backend: BackendConfig {
                base_url: Url::parse(&backend.url).unwrap(),
            },
            square: SquareConfig {
                environment: SquareEnvironment::Sandbox,
                base_url_override: Some(Url::parse(&square.url).unwrap()),
                access_token: SecretString::from("test-access-token"),
                location_id: "L_TEST".to_owned(),
            },
            sentry_dsn: None,
        };

        let state = AppState::new(config);
        let app = Router::new().merge(routes::routes()).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap();

        Self {
            client,
            base_url: format!("http://{addr}"),
            backend,
            square,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A client without a cookie store, for anonymous requests.
    #[must_use]
    pub fn plain_client() -> reqwest::Client {
        reqwest::Client::new()
    }

    /// Log in through the storefront; the session cookie lands in
    /// `self.client`'s cookie store.
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }
}
