//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as plain JSON numbers (`9.99`), so the wrapper serializes
//! through `rust_decimal`'s float codec while all arithmetic stays in
//! `Decimal` to avoid binary rounding in subtotals.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing a price from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("invalid price {0:?}: not a decimal number")]
    Invalid(String),
    #[error("invalid price {0}: must not be negative")]
    Negative(Decimal),
    #[error("invalid price {0}: at most 2 decimal places")]
    TooPrecise(Decimal),
}

/// Decimal places accepted from user input. Wider values would not survive
/// the float codec on the wire.
pub const MAX_SCALE: u32 = 2;

/// A unit price in the storefront's currency.
///
/// Deserialization goes through [`Price::new`], so persisted negative prices
/// are rejected like any other input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "WirePrice", into = "WirePrice")]
pub struct Price(Decimal);

/// JSON-number form of a price.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
struct WirePrice(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl TryFrom<WirePrice> for Price {
    type Error = PriceError;

    fn try_from(wire: WirePrice) -> Result<Self, Self::Error> {
        Self::new(wire.0)
    }
}

impl From<Price> for WirePrice {
    fn from(price: Price) -> Self {
        Self(price.0)
    }
}

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Build a price from an integer number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price multiplied by a quantity, saturating on overflow.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }
}

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_string()))?;
        if amount.normalize().scale() > MAX_SCALE {
            return Err(PriceError::TooPrecise(amount));
        }
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("${:.2}", self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_parses_and_formats() {
        let price: Price = "9.99".parse().expect("valid price");
        assert_eq!(price, Price::from_cents(999));
        assert_eq!(price.to_string(), "$9.99");
        assert_eq!(Price::from_cents(500).to_string(), "$5.00");
    }

    #[test]
    fn test_price_rejects_negative_and_garbage() {
        assert!(matches!("-1".parse::<Price>(), Err(PriceError::Negative(_))));
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::Invalid(_))));
        assert!("0".parse::<Price>().is_ok());
    }

    #[test]
    fn test_price_rejects_excess_precision() {
        assert!(matches!(
            "0.12345678901234567891".parse::<Price>(),
            Err(PriceError::TooPrecise(_))
        ));
        assert!(matches!("1.999".parse::<Price>(), Err(PriceError::TooPrecise(_))));
        assert_eq!("1.50".parse::<Price>(), Ok(Price::from_cents(150)));
        assert_eq!("1.500".parse::<Price>(), Ok(Price::from_cents(150)));
    }

    #[test]
    fn test_parsed_price_survives_json() {
        for input in ["0.01", "9.99", "12345678.99", "0"] {
            let price: Price = input.parse().expect("valid price");
            let json = serde_json::to_string(&price).expect("serialize");
            let back: Price = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, price, "{input} changed through {json}");
        }
    }

    #[test]
    fn test_negative_price_rejected_on_load() {
        assert!(serde_json::from_str::<Price>("-5").is_err());
        let price: Price = serde_json::from_str("5").expect("valid price");
        assert_eq!(price, Price::from_cents(500));
    }

    #[test]
    fn test_price_json_is_a_number() {
        let price = Price::from_cents(999);
        let json = serde_json::to_value(price).expect("serialize");
        assert!(json.is_number());

        let parsed: Price = serde_json::from_str("9.99").expect("deserialize");
        assert_eq!(parsed, price);
    }

    #[test]
    fn test_price_arithmetic() {
        let unit = Price::from_cents(250);
        assert_eq!(unit.times(3), Price::from_cents(750));
        let total: Price = [unit, Price::from_cents(100)].into_iter().sum();
        assert_eq!(total, Price::from_cents(350));
    }
}
