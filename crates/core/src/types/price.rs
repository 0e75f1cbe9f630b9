//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as strings in JSON documents (`"25.99"`) so no value
//! ever passes through binary floating point.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::ValidationError;

/// A shop price in euros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero euros.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest price accepted for a product: €1,000,000.00.
    pub const MAX: Self = Self(Decimal::from_parts(100_000_000, 0, 0, false, 2));

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a price entered in a form field.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Invalid` unless the input is a positive number
    /// no larger than [`Price::MAX`].
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let amount: Decimal = input
            .trim()
            .parse()
            .map_err(|_| ValidationError::invalid("price", "a valid positive number"))?;
        let price = Self(amount);
        price.ensure_positive()?;
        Ok(price)
    }

    /// Check that the price is strictly positive and at most [`Price::MAX`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Invalid` for zero, negative or oversized amounts.
    pub fn ensure_positive(&self) -> Result<(), ValidationError> {
        if self.0 > Decimal::ZERO && *self <= Self::MAX {
            Ok(())
        } else {
            Err(ValidationError::invalid("price", "a valid positive number"))
        }
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity, saturating at the decimal range.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl core::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

impl fmt::Display for Price {
    /// Formats as `€25.99`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "€{:.2}", self.0)
    }
}
