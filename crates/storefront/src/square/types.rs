//! Wire types for the Square API and their domain counterparts.
//!
//! DTO structs mirror Square's JSON exactly (minor-unit integers, string
//! enums); the domain types below them carry [`Money`] and typed ids.
//! Conversion happens in `TryFrom` impls so the client surface only ever
//! deals in domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use giftwell_core::{ActivityId, CurrencyCode, GiftCardId, Money, MoneyError, PaymentLinkId};

use super::ErrorDetail;

/// Generic response envelope. Square returns errors in a top-level `errors`
/// array alongside (or instead of) the payload fields.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
    #[serde(flatten)]
    pub data: Option<T>,
}

/// Money as Square sends it: integer minor units plus a currency string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyDto {
    pub amount: i64,
    pub currency: String,
}

impl TryFrom<&Money> for MoneyDto {
    type Error = MoneyError;

    fn try_from(money: &Money) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: money.to_minor_units()?,
            currency: money.currency.as_str().to_owned(),
        })
    }
}

impl TryFrom<MoneyDto> for Money {
    type Error = String;

    fn try_from(dto: MoneyDto) -> Result<Self, Self::Error> {
        let currency = CurrencyCode::parse(&dto.currency)
            .ok_or_else(|| format!("unknown currency code: {}", dto.currency))?;
        Ok(Self::from_minor_units(dto.amount, currency))
    }
}

/// Gift card activity types. Square adds new ones over time, so unknown
/// values decode as [`ActivityType::Other`] instead of failing the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Activate,
    Load,
    Redeem,
    Refund,
    #[serde(other)]
    Other,
}

impl ActivityType {
    /// Logical operation name used in idempotency key derivation.
    #[must_use]
    pub(super) const fn operation_name(self) -> &'static str {
        match self {
            Self::Activate => "gift-card-activate",
            Self::Load => "gift-card-load",
            Self::Redeem => "gift-card-redeem",
            Self::Refund => "gift-card-refund",
            Self::Other => "gift-card-activity",
        }
    }
}

// Request bodies.

#[derive(Debug, Serialize)]
pub(super) struct CreateGiftCardRequest {
    pub idempotency_key: String,
    pub location_id: String,
    pub gift_card: GiftCardInput,
}

#[derive(Debug, Serialize)]
pub(super) struct GiftCardInput {
    #[serde(rename = "type")]
    pub card_type: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateActivityRequest {
    pub idempotency_key: String,
    pub gift_card_activity: GiftCardActivityInput,
}

#[derive(Debug, Serialize)]
pub(super) struct GiftCardActivityInput {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub location_id: String,
    pub gift_card_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activate_activity_details: Option<ActivityAmountDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_activity_details: Option<ActivityAmountDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeem_activity_details: Option<ActivityAmountDetails>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ActivityAmountDetails {
    pub amount_money: MoneyDto,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatePaymentLinkRequest {
    pub idempotency_key: String,
    pub quick_pay: QuickPay,
}

#[derive(Debug, Serialize)]
pub(super) struct QuickPay {
    pub name: String,
    pub price_money: MoneyDto,
    pub location_id: String,
}

// Response bodies.

#[derive(Debug, Deserialize)]
pub(super) struct CreateGiftCardResponse {
    pub gift_card: Option<GiftCardDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RetrieveGiftCardResponse {
    pub gift_card: Option<GiftCardDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateActivityResponse {
    pub gift_card_activity: Option<GiftCardActivityDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListActivitiesResponse {
    pub gift_card_activities: Option<Vec<GiftCardActivityDto>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatePaymentLinkResponse {
    pub payment_link: Option<PaymentLinkDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GiftCardDto {
    pub id: String,
    #[serde(default)]
    pub gan: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub balance_money: Option<MoneyDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GiftCardActivityDto {
    pub id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub gift_card_id: String,
    #[serde(default)]
    pub gift_card_balance_money: Option<MoneyDto>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activate_activity_details: Option<ActivityAmountDetails>,
    #[serde(default)]
    pub load_activity_details: Option<ActivityAmountDetails>,
    #[serde(default)]
    pub redeem_activity_details: Option<ActivityAmountDetails>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PaymentLinkDto {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub order_id: Option<String>,
}

// Domain types.

/// A gift card as the storefront sees it.
#[derive(Debug, Clone, Serialize)]
pub struct GiftCard {
    pub id: GiftCardId,
    /// Gift card account number, when Square has assigned one.
    pub gan: Option<String>,
    pub state: Option<String>,
    pub balance: Option<Money>,
}

impl TryFrom<GiftCardDto> for GiftCard {
    type Error = String;

    fn try_from(dto: GiftCardDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GiftCardId::new(dto.id),
            gan: dto.gan,
            state: dto.state,
            balance: dto.balance_money.map(Money::try_from).transpose()?,
        })
    }
}

/// One entry in a gift card's activity ledger.
#[derive(Debug, Clone, Serialize)]
pub struct GiftCardActivity {
    pub id: ActivityId,
    pub kind: ActivityType,
    pub gift_card_id: GiftCardId,
    /// Amount this activity moved, when it carried one.
    pub amount: Option<Money>,
    /// Card balance after the activity was applied.
    pub balance_after: Option<Money>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<GiftCardActivityDto> for GiftCardActivity {
    type Error = String;

    fn try_from(dto: GiftCardActivityDto) -> Result<Self, Self::Error> {
        let details = dto
            .activate_activity_details
            .or(dto.load_activity_details)
            .or(dto.redeem_activity_details);

        Ok(Self {
            id: ActivityId::new(dto.id),
            kind: dto.activity_type,
            gift_card_id: GiftCardId::new(dto.gift_card_id),
            amount: details
                .map(|d| Money::try_from(d.amount_money))
                .transpose()?,
            balance_after: dto.gift_card_balance_money.map(Money::try_from).transpose()?,
            created_at: dto.created_at,
        })
    }
}

/// A hosted checkout link for a gift card purchase.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentLink {
    pub id: PaymentLinkId,
    pub url: String,
    pub order_id: Option<String>,
}

impl From<PaymentLinkDto> for PaymentLink {
    fn from(dto: PaymentLinkDto) -> Self {
        Self {
            id: PaymentLinkId::new(dto.id),
            url: dto.url,
            order_id: dto.order_id,
        }
    }
}
