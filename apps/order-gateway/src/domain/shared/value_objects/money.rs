//! Money value object for currency amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monetary amount in the venue's currency.
///
/// Represented as a Decimal for precise calculations. Providers that expect
/// integer minor units (agorot, cents) use [`Money::to_minor_units`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Money value from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money value from minor units (integer cents/agorot).
    #[must_use]
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount expressed in integer minor units, rounded half-away-from-zero.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        use rust_decimal::RoundingStrategy;
        use rust_decimal::prelude::ToPrimitive;

        self.0
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }

    /// Sum of two amounts, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Amount times a unit count, or `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Returns true if this amount is positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn minor_units_round_trip() {
        let money = Money::from_minor_units(12_345);
        assert_eq!(money.amount(), dec!(123.45));
        assert_eq!(money.to_minor_units(), Some(12_345));
    }

    #[test]
    fn minor_units_round_fractional_amounts() {
        assert_eq!(Money::new(dec!(10.005)).to_minor_units(), Some(1001));
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::new(dec!(7.5)).to_string(), "7.50");
    }

    #[test]
    fn arithmetic() {
        let unit = Money::new(dec!(12.50));
        let line = unit.checked_mul(3).and_then(|m| m.checked_add(Money::new(dec!(1))));
        assert_eq!(line, Some(Money::new(dec!(38.50))));
    }

    #[test]
    fn huge_amounts_have_no_minor_units() {
        assert_eq!(Money::new(Decimal::MAX).to_minor_units(), None);
        assert_eq!(Money::new(Decimal::MIN).to_minor_units(), None);
    }

    #[test]
    fn amounts_past_i64_have_no_minor_units() {
        let past_i64 = Money::new(Decimal::from(i64::MAX));
        assert_eq!(past_i64.to_minor_units(), None);
    }

    #[test]
    fn overflowing_arithmetic_is_none() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_add(Money::new(dec!(1))), None);
        assert_eq!(max.checked_mul(2), None);
        assert_eq!(max.checked_mul(1), Some(max));
    }
}
