//! HTTP route handlers.

pub mod auth;
pub mod cards;
pub mod gift_cards;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Build the application router.
#[must_use]
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .route("/api/cards", get(cards::list))
        .route("/api/cards/{card_id}", delete(cards::remove))
        .route("/api/cards/{card_id}/default", put(cards::set_default))
        .route("/api/gift-cards", post(gift_cards::create))
        .route("/api/gift-cards/{gift_card_id}", get(gift_cards::retrieve))
        .route("/api/gift-cards/{gift_card_id}/redeem", post(gift_cards::redeem))
        .route("/api/gift-cards/{gift_card_id}/load", post(gift_cards::load))
        .route(
            "/api/gift-cards/{gift_card_id}/activities",
            get(gift_cards::activities),
        )
        .route("/api/checkout/payment-link", post(gift_cards::payment_link))
}

/// Liveness probe.
async fn health() -> &'static str {
    "OK"
}

/// Readiness probe: verifies the account backend is reachable.
async fn ready(State(state): State<AppState>) -> StatusCode {
    match state.backend().health().await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
