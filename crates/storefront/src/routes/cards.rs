//! Saved payment method endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use giftwell_core::CardId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::SavedCard;
use crate::state::AppState;

/// GET /api/cards
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<Json<Vec<SavedCard>>> {
    let cards = state.cards().list(&principal.token).await?;
    Ok(Json(cards))
}

/// DELETE /api/cards/{card_id}
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(card_id): Path<CardId>,
) -> Result<StatusCode> {
    state.cards().delete(&principal.token, &card_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/cards/{card_id}/default
///
/// Returns the updated list so the client can re-render without a follow-up
/// fetch.
pub async fn set_default(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(card_id): Path<CardId>,
) -> Result<Json<Vec<SavedCard>>> {
    let cards = state.cards().set_default(&principal.token, &card_id).await?;
    Ok(Json(cards))
}
