//! Monetary amounts with currency information.
//!
//! Amounts are held in the currency's standard unit (e.g., dollars) as
//! [`Decimal`] values. The payment vendor speaks in minor units (cents), so
//! conversion happens exactly once, at the vendor boundary:
//! [`Money::to_minor_units`] on the way out and [`Money::from_minor_units`]
//! on the way in.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when converting a [`Money`] amount.
#[derive(thiserror::Error, Debug, Clone)]
pub enum MoneyError {
    /// The amount does not fit in a signed 64-bit minor-unit count.
    #[error("amount {0} is out of range for minor-unit conversion")]
    OutOfRange(Decimal),
    /// The amount is negative where a non-negative amount is required.
    #[error("amount {0} must not be negative")]
    Negative(Decimal),
}

/// A monetary amount with its ISO 4217 currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Create an amount from a minor-unit count (e.g., cents).
    #[must_use]
    pub fn from_minor_units(minor: i64, currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::new(minor, 2),
            currency,
        }
    }

    /// Convert to a minor-unit count (e.g., cents), rounding to the nearest
    /// whole minor unit.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::OutOfRange`] if the scaled amount does not fit
    /// in an `i64`.
    pub fn to_minor_units(&self) -> Result<i64, MoneyError> {
        let scaled = self
            .amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::OutOfRange(self.amount))?;
        scaled
            .round()
            .to_i64()
            .ok_or(MoneyError::OutOfRange(self.amount))
    }

    /// Ensure the amount is non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for negative amounts.
    pub fn require_non_negative(&self) -> Result<(), MoneyError> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(MoneyError::Negative(self.amount));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

/// ISO 4217 currency codes accepted by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The three-letter code as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Parse a three-letter code, case-insensitively.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            "CAD" => Some(Self::CAD),
            "AUD" => Some(Self::AUD),
            _ => None,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn usd(s: &str) -> Money {
        Money::new(s.parse().unwrap(), CurrencyCode::USD)
    }

    #[test]
    fn test_minor_unit_round_trip() {
        let money = usd("19.99");
        let minor = money.to_minor_units().unwrap();
        assert_eq!(minor, 1999);

        let back = Money::from_minor_units(minor, CurrencyCode::USD);
        assert_eq!(back.amount, money.amount);
    }

    #[test]
    fn test_whole_dollar_amounts() {
        assert_eq!(usd("50").to_minor_units().unwrap(), 5000);

        let back = Money::from_minor_units(5000, CurrencyCode::USD);
        assert_eq!(back.amount, "50.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_zero() {
        let money = Money::new(Decimal::ZERO, CurrencyCode::USD);
        assert_eq!(money.to_minor_units().unwrap(), 0);
        assert!(money.require_non_negative().is_ok());
    }

    #[test]
    fn test_sub_cent_amounts_round() {
        // Banker's rounding: 0.5 rounds to the even neighbor
        assert_eq!(usd("0.005").to_minor_units().unwrap(), 0);
        assert_eq!(usd("0.015").to_minor_units().unwrap(), 2);
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            usd("-5.00").require_non_negative(),
            Err(MoneyError::Negative(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(usd("19.99").to_string(), "19.99 USD");
    }

    #[test]
    fn test_currency_code_as_str() {
        assert_eq!(CurrencyCode::USD.as_str(), "USD");
        assert_eq!(CurrencyCode::GBP.as_str(), "GBP");
    }

    #[test]
    fn test_currency_code_parse() {
        assert_eq!(CurrencyCode::parse("usd"), Some(CurrencyCode::USD));
        assert_eq!(CurrencyCode::parse("EUR"), Some(CurrencyCode::EUR));
        assert_eq!(CurrencyCode::parse("XTS"), None);
    }
}
