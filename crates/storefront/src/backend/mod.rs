//! Account backend API client.
//!
//! The account backend owns users, sessions, and saved payment methods. This
//! client forwards the caller's session token as the `gw_session` cookie and
//! exposes typed operations over the backend's REST surface:
//!
//! - `GET  /api/auth/user`         - admin identity probe
//! - `GET  /api/auth/customer`     - customer identity probe
//! - `POST /api/auth/login`        - credential login
//! - `POST /api/auth/logout`       - session teardown
//! - `GET  /api/cards`             - saved card listing
//! - `DELETE /api/cards/{id}`      - saved card removal
//! - `PUT  /api/cards/{id}/default` - default card selection

pub mod types;

use std::sync::Arc;

use reqwest::{StatusCode, header};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use giftwell_core::{CardId, Email};

use crate::config::BackendConfig;
use crate::models::{SESSION_COOKIE_NAME, SavedCard, Session, SessionToken};

use types::{IdentityResponse, LoginRequest, LoginResponse};

/// Errors that can occur when talking to the account backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the credentials or session (401/403).
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("unexpected status {status}: {body}")]
    Status {
        status: StatusCode,
        /// First part of the response body, for diagnostics.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the account backend API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                http: reqwest::Client::new(),
                base_url: config.base_url.clone(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
    }

    fn session_cookie(token: &SessionToken) -> String {
        format!("{SESSION_COOKIE_NAME}={}", token.expose())
    }

    /// Read a response body and decode it, with status handling shared by
    /// all operations.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized);
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status,
                body: text.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Check a no-content response's status.
    fn check(response: &reqwest::Response, not_found: Option<&str>) -> Result<(), BackendError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND
            && let Some(what) = not_found
        {
            return Err(BackendError::NotFound(what.to_owned()));
        }
        if !status.is_success() {
            return Err(BackendError::Status {
                status,
                body: String::new(),
            });
        }
        Ok(())
    }

    async fn fetch_identity(
        &self,
        path: &str,
        token: &SessionToken,
    ) -> Result<Session, BackendError> {
        let response = self
            .inner
            .http
            .get(self.endpoint(path))
            .header(header::COOKIE, Self::session_cookie(token))
            .send()
            .await?;

        let identity: IdentityResponse = Self::decode(response).await?;
        Ok(identity.into())
    }

    /// Probe the admin session endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if no admin session backs the token or the request
    /// fails.
    #[instrument(skip(self, token))]
    pub async fn admin_identity(&self, token: &SessionToken) -> Result<Session, BackendError> {
        self.fetch_identity("/api/auth/user", token).await
    }

    /// Probe the customer session endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if no customer session backs the token or the
    /// request fails.
    #[instrument(skip(self, token))]
    pub async fn customer_identity(&self, token: &SessionToken) -> Result<Session, BackendError> {
        self.fetch_identity("/api/auth/customer", token).await
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] when the backend rejects the
    /// credentials, or another error if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<LoginResponse, BackendError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("/api/auth/login"))
            .json(&LoginRequest {
                email: email.as_str(),
                password,
            })
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Tear down the session behind a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; callers that only need
    /// best-effort teardown may ignore it.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &SessionToken) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("/api/auth/logout"))
            .header(header::COOKIE, Self::session_cookie(token))
            .send()
            .await?;

        Self::check(&response, None)
    }

    /// List the customer's saved cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_cards(&self, token: &SessionToken) -> Result<Vec<SavedCard>, BackendError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("/api/cards"))
            .header(header::COOKIE, Self::session_cookie(token))
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Delete a saved card.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the card does not exist, or
    /// another error if the request fails.
    #[instrument(skip(self, token), fields(card_id = %card_id))]
    pub async fn delete_card(
        &self,
        token: &SessionToken,
        card_id: &CardId,
    ) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .delete(self.endpoint(&format!("/api/cards/{card_id}")))
            .header(header::COOKIE, Self::session_cookie(token))
            .send()
            .await?;

        Self::check(&response, Some(card_id.as_str()))
    }

    /// Make a saved card the customer's default.
    ///
    /// The backend clears the flag on every other card of the customer.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the card does not exist, or
    /// another error if the request fails.
    #[instrument(skip(self, token), fields(card_id = %card_id))]
    pub async fn set_default_card(
        &self,
        token: &SessionToken,
        card_id: &CardId,
    ) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .put(self.endpoint(&format!("/api/cards/{card_id}/default")))
            .header(header::COOKIE, Self::session_cookie(token))
            .send()
            .await?;

        Self::check(&response, Some(card_id.as_str()))
    }

    /// Check backend reachability (used by the readiness probe).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend's health endpoint is unreachable or
    /// unhealthy.
    pub async fn health(&self) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("/health"))
            .send()
            .await?;

        Self::check(&response, None)
    }
}
