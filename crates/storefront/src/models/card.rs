//! Saved payment method models.

use serde::{Deserialize, Serialize};

use giftwell_core::CardId;

/// A payment card the customer saved with the account backend.
///
/// The backend owns the set; this is a cached read model. Invariant (held by
/// the backend, preserved by optimistic updates here): at most one card per
/// customer has `is_default == true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCard {
    pub id: CardId,
    /// Card network (e.g., "visa", "mastercard").
    pub brand: String,
    /// Last four digits of the PAN.
    pub last4: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub holder_name: Option<String>,
    pub nickname: Option<String>,
    pub is_default: bool,
}
