//! Square gift card API client.
//!
//! # Architecture
//!
//! - Square is source of truth for gift cards - NO local state, direct API
//!   calls; every operation is stateless per call (no retries, no circuit
//!   breaking)
//! - Monetary amounts cross this boundary in minor units (cents); domain
//!   code uses [`Money`] in major units
//! - Mutating calls carry a deterministic idempotency key derived from the
//!   logical operation, the target, and a caller-supplied correlation id
//!   (see [`idempotency`]), so a retried request replays instead of
//!   double-charging
//!
//! # Example
//!
//! ```rust,ignore
//! use giftwell_storefront::square::SquareClient;
//!
//! let client = SquareClient::new(&config.square);
//!
//! // Issue a card, then redeem part of it
//! let card = client.create_gift_card(&correlation_id, amount).await?;
//! let activity = client.redeem(&correlation_id, &card.id, redeem_amount).await?;
//! ```

pub mod idempotency;
pub mod types;

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use giftwell_core::{GiftCardId, Money, MoneyError};

use crate::config::SquareConfig;

use idempotency::idempotency_key;
use types::{
    ActivityAmountDetails, ActivityType, CreateActivityRequest, CreateGiftCardRequest,
    CreatePaymentLinkRequest, Envelope, GiftCard, GiftCardActivity, GiftCardActivityInput,
    GiftCardInput, MoneyDto, PaymentLink, QuickPay,
};

/// Pinned Square API version sent on every request.
pub const SQUARE_API_VERSION: &str = "2025-07-16";

/// Errors that can occur when interacting with the Square API.
#[derive(Debug, Error)]
pub enum SquareError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned one or more errors; details are aggregated into one
    /// message.
    #[error("Square API errors: {}", format_error_details(.0))]
    Api(Vec<ErrorDetail>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Square.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The response parsed but did not carry the expected payload.
    #[error("unexpected payload: {0}")]
    Payload(String),

    /// A monetary amount could not cross the minor-unit boundary.
    #[error("money conversion error: {0}")]
    Money(#[from] MoneyError),
}

/// A single error entry from a Square response's `errors` array.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ErrorDetail {
    pub category: String,
    pub code: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

fn format_error_details(errors: &[ErrorDetail]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_owned();
    }

    errors
        .iter()
        .map(|e| {
            let mut message = format!("{} {}", e.category, e.code);
            if let Some(detail) = &e.detail {
                message.push_str(": ");
                message.push_str(detail);
            }
            if let Some(field) = &e.field {
                message.push_str(&format!(" (field: {field})"));
            }
            message
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Client for the Square gift card and payment link APIs.
#[derive(Clone)]
pub struct SquareClient {
    inner: Arc<SquareClientInner>,
}

struct SquareClientInner {
    http: reqwest::Client,
    base_url: String,
    access_token: SecretString,
    location_id: String,
}

impl SquareClient {
    /// Create a new Square client.
    #[must_use]
    pub fn new(config: &SquareConfig) -> Self {
        Self {
            inner: Arc::new(SquareClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_base_url(),
                access_token: config.access_token.clone(),
                location_id: config.location_id.clone(),
            }),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .http
            .request(method, format!("{}{path}", self.inner.base_url))
            .bearer_auth(self.inner.access_token.expose_secret())
            .header("Square-Version", SQUARE_API_VERSION)
    }

    /// Send a request and decode the enveloped response, translating the
    /// `errors` array and non-success statuses into [`SquareError::Api`].
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SquareError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SquareError::RateLimited(retry_after));
        }

        let text = response.text().await?;

        let envelope: Envelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(
                    status = %status,
                    body = %text.chars().take(500).collect::<String>(),
                    "failed to parse Square response"
                );
                return Err(SquareError::Parse(err));
            }
        };

        if !envelope.errors.is_empty() {
            return Err(SquareError::Api(envelope.errors));
        }

        if !status.is_success() {
            // Non-success without an errors array; synthesize one detail so
            // callers see a uniform error shape.
            return Err(SquareError::Api(vec![ErrorDetail {
                category: "API_ERROR".to_owned(),
                code: format!("HTTP_{}", status.as_u16()),
                detail: Some(text.chars().take(200).collect()),
                field: None,
            }]));
        }

        envelope
            .data
            .ok_or_else(|| SquareError::Payload("no data in response".to_owned()))
    }

    async fn create_activity(
        &self,
        kind: ActivityType,
        gift_card_id: &GiftCardId,
        amount: Option<Money>,
        correlation_id: &str,
    ) -> Result<GiftCardActivity, SquareError> {
        let amount_details = match amount {
            Some(money) => {
                money.require_non_negative()?;
                Some(ActivityAmountDetails {
                    amount_money: MoneyDto::try_from(&money)?,
                })
            }
            None => None,
        };

        let mut input = GiftCardActivityInput {
            activity_type: kind,
            location_id: self.inner.location_id.clone(),
            gift_card_id: gift_card_id.as_str().to_owned(),
            activate_activity_details: None,
            load_activity_details: None,
            redeem_activity_details: None,
        };
        match kind {
            ActivityType::Activate => input.activate_activity_details = amount_details,
            ActivityType::Load => input.load_activity_details = amount_details,
            ActivityType::Redeem => input.redeem_activity_details = amount_details,
            ActivityType::Refund | ActivityType::Other => {
                return Err(SquareError::Payload(format!(
                    "unsupported activity type: {kind:?}"
                )));
            }
        }

        let body = CreateActivityRequest {
            idempotency_key: idempotency_key(
                kind.operation_name(),
                gift_card_id.as_str(),
                correlation_id,
            ),
            gift_card_activity: input,
        };

        let response: types::CreateActivityResponse = self
            .execute(
                self.request(reqwest::Method::POST, "/v2/gift-cards/activities")
                    .json(&body),
            )
            .await?;

        let dto = response
            .gift_card_activity
            .ok_or_else(|| SquareError::Payload("no activity returned".to_owned()))?;
        dto.try_into().map_err(SquareError::Payload)
    }

    /// Issue a new digital gift card loaded with `amount`.
    ///
    /// Two vendor calls: create the card, then an `ACTIVATE` activity with
    /// the purchase amount. Both carry keys derived from the same
    /// correlation id, so a retried purchase replays rather than issuing a
    /// second card.
    ///
    /// # Errors
    ///
    /// Returns an error if either API call fails or returns vendor errors.
    #[instrument(skip(self))]
    pub async fn create_gift_card(
        &self,
        correlation_id: &str,
        amount: Money,
    ) -> Result<GiftCard, SquareError> {
        amount.require_non_negative()?;

        let body = CreateGiftCardRequest {
            idempotency_key: idempotency_key("gift-card-create", "new", correlation_id),
            location_id: self.inner.location_id.clone(),
            gift_card: GiftCardInput {
                card_type: "DIGITAL".to_owned(),
            },
        };

        let response: types::CreateGiftCardResponse = self
            .execute(self.request(reqwest::Method::POST, "/v2/gift-cards").json(&body))
            .await?;

        let dto = response
            .gift_card
            .ok_or_else(|| SquareError::Payload("no gift card returned".to_owned()))?;
        let card: GiftCard = dto.try_into().map_err(SquareError::Payload)?;

        let activity = self
            .create_activity(ActivityType::Activate, &card.id, Some(amount), correlation_id)
            .await?;

        Ok(GiftCard {
            balance: activity.balance_after.or(Some(amount)),
            ..card
        })
    }

    /// Redeem (spend) `amount` from a gift card.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails, the balance is insufficient,
    /// or vendor errors are returned.
    #[instrument(skip(self), fields(gift_card_id = %gift_card_id))]
    pub async fn redeem(
        &self,
        correlation_id: &str,
        gift_card_id: &GiftCardId,
        amount: Money,
    ) -> Result<GiftCardActivity, SquareError> {
        self.create_activity(ActivityType::Redeem, gift_card_id, Some(amount), correlation_id)
            .await
    }

    /// Load (refund) `amount` back onto a gift card.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or vendor errors are returned.
    #[instrument(skip(self), fields(gift_card_id = %gift_card_id))]
    pub async fn load(
        &self,
        correlation_id: &str,
        gift_card_id: &GiftCardId,
        amount: Money,
    ) -> Result<GiftCardActivity, SquareError> {
        self.create_activity(ActivityType::Load, gift_card_id, Some(amount), correlation_id)
            .await
    }

    /// Fetch a gift card with its current balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the card is not found or the API call fails.
    #[instrument(skip(self), fields(gift_card_id = %gift_card_id))]
    pub async fn get_gift_card(&self, gift_card_id: &GiftCardId) -> Result<GiftCard, SquareError> {
        let response: types::RetrieveGiftCardResponse = self
            .execute(self.request(
                reqwest::Method::GET,
                &format!("/v2/gift-cards/{gift_card_id}"),
            ))
            .await?;

        let dto = response
            .gift_card
            .ok_or_else(|| SquareError::Payload("no gift card returned".to_owned()))?;
        dto.try_into().map_err(SquareError::Payload)
    }

    /// List the activity ledger of a gift card, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    #[instrument(skip(self), fields(gift_card_id = %gift_card_id))]
    pub async fn list_activities(
        &self,
        gift_card_id: &GiftCardId,
    ) -> Result<Vec<GiftCardActivity>, SquareError> {
        let response: types::ListActivitiesResponse = self
            .execute(
                self.request(reqwest::Method::GET, "/v2/gift-cards/activities")
                    .query(&[
                        ("gift_card_id", gift_card_id.as_str()),
                        ("location_id", self.inner.location_id.as_str()),
                    ]),
            )
            .await?;

        response
            .gift_card_activities
            .unwrap_or_default()
            .into_iter()
            .map(|dto| dto.try_into().map_err(SquareError::Payload))
            .collect()
    }

    /// Create a hosted payment link for a gift card purchase.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or vendor errors are returned.
    #[instrument(skip(self))]
    pub async fn create_payment_link(
        &self,
        correlation_id: &str,
        name: &str,
        amount: Money,
    ) -> Result<PaymentLink, SquareError> {
        amount.require_non_negative()?;

        let body = CreatePaymentLinkRequest {
            idempotency_key: idempotency_key("payment-link-create", name, correlation_id),
            quick_pay: QuickPay {
                name: name.to_owned(),
                price_money: MoneyDto::try_from(&amount)?,
                location_id: self.inner.location_id.clone(),
            },
        };

        let response: types::CreatePaymentLinkResponse = self
            .execute(
                self.request(reqwest::Method::POST, "/v2/online-checkout/payment-links")
                    .json(&body),
            )
            .await?;

        let dto = response
            .payment_link
            .ok_or_else(|| SquareError::Payload("no payment link returned".to_owned()))?;
        Ok(dto.into())
    }
}
