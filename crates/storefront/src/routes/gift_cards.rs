//! Gift card and checkout endpoints over the Square adapter.
//!
//! Amounts arrive as decimal major units and are validated here; the Square
//! client converts to minor units at the wire boundary. Every mutating
//! request may carry a `correlation_id`; absent one, a fresh id is generated,
//! which makes the call effectively non-idempotent across retries.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use giftwell_core::{CurrencyCode, GiftCardId, Money};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::square::types::{GiftCard, GiftCardActivity, PaymentLink};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AmountBody {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentLinkBody {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

fn positive_money(amount: Decimal, currency: Option<CurrencyCode>) -> Result<Money> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(AppError::BadRequest("amount must be positive".to_owned()));
    }
    Ok(Money::new(amount, currency.unwrap_or_default()))
}

fn correlation_id(explicit: Option<String>) -> String {
    explicit.unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// POST /api/gift-cards
///
/// Issue a new digital gift card loaded with the given amount. Admin only.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_principal): RequireAdmin,
    Json(body): Json<AmountBody>,
) -> Result<Json<GiftCard>> {
    let amount = positive_money(body.amount, body.currency)?;
    let correlation_id = correlation_id(body.correlation_id);

    let card = state.square().create_gift_card(&correlation_id, amount).await?;
    Ok(Json(card))
}

/// GET /api/gift-cards/{gift_card_id}
pub async fn retrieve(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    Path(gift_card_id): Path<GiftCardId>,
) -> Result<Json<GiftCard>> {
    let card = state.square().get_gift_card(&gift_card_id).await?;
    Ok(Json(card))
}

/// POST /api/gift-cards/{gift_card_id}/redeem
pub async fn redeem(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    Path(gift_card_id): Path<GiftCardId>,
    Json(body): Json<AmountBody>,
) -> Result<Json<GiftCardActivity>> {
    let amount = positive_money(body.amount, body.currency)?;
    let correlation_id = correlation_id(body.correlation_id);

    let activity = state
        .square()
        .redeem(&correlation_id, &gift_card_id, amount)
        .await?;
    Ok(Json(activity))
}

/// POST /api/gift-cards/{gift_card_id}/load
///
/// Add funds back onto a card (refunds, top-ups). Admin only.
pub async fn load(
    State(state): State<AppState>,
    RequireAdmin(_principal): RequireAdmin,
    Path(gift_card_id): Path<GiftCardId>,
    Json(body): Json<AmountBody>,
) -> Result<Json<GiftCardActivity>> {
    let amount = positive_money(body.amount, body.currency)?;
    let correlation_id = correlation_id(body.correlation_id);

    let activity = state
        .square()
        .load(&correlation_id, &gift_card_id, amount)
        .await?;
    Ok(Json(activity))
}

/// GET /api/gift-cards/{gift_card_id}/activities
pub async fn activities(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    Path(gift_card_id): Path<GiftCardId>,
) -> Result<Json<Vec<GiftCardActivity>>> {
    let activities = state.square().list_activities(&gift_card_id).await?;
    Ok(Json(activities))
}

/// POST /api/checkout/payment-link
///
/// Create a hosted checkout link for purchasing a gift card.
pub async fn payment_link(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    Json(body): Json<PaymentLinkBody>,
) -> Result<Json<PaymentLink>> {
    let amount = positive_money(body.amount, body.currency)?;
    let correlation_id = correlation_id(body.correlation_id);
    let name = body.name.unwrap_or_else(|| "Gift Card".to_owned());

    let link = state
        .square()
        .create_payment_link(&correlation_id, &name, amount)
        .await?;
    Ok(Json(link))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_money_rejects_zero_and_negative() {
        assert!(positive_money(Decimal::ZERO, None).is_err());
        assert!(positive_money(Decimal::new(-100, 2), None).is_err());
    }

    #[test]
    fn test_positive_money_defaults_to_usd() {
        let money = positive_money(Decimal::new(1999, 2), None).unwrap();
        assert_eq!(money.currency, CurrencyCode::USD);
    }

    #[test]
    fn test_correlation_id_passthrough_and_default() {
        assert_eq!(correlation_id(Some("order-1".to_owned())), "order-1");

        let generated = correlation_id(None);
        assert!(Uuid::parse_str(&generated).is_ok());
    }
}
