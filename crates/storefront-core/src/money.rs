//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "10.00" ──parse──► 1000 cents                                        │
//! │    1000 × 2 + 350 = 2350 cents ──display──► "23.50"                     │
//! │                                                                         │
//! │  Prices are parsed from and rendered to decimal strings at the edge.   │
//! │  Everything in between is i64 cents with checked arithmetic.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(1099);
//! assert_eq!(price.to_decimal_string(), "10.99");
//!
//! let parsed: Money = "3.5".parse().unwrap();
//! assert_eq!(parsed.cents(), 350);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// Serializes as the bare cent count. The HTTP layer is responsible for
/// rendering the decimal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// Product A: 10.00
    /// Quantity: 2
    ///      │
    ///      ▼
    /// checked_mul_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: 20.00
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Renders the amount with exactly two fractional digits (`"23.50"`).
    pub fn to_decimal_string(&self) -> String {
        self.to_string()
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Reasons a decimal price string can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("value is empty")]
    Empty,

    #[error("value must not be negative")]
    Negative,

    #[error("value must have at most 2 decimal places")]
    TooManyDecimals,

    #[error("value is not a valid decimal number")]
    Invalid,

    #[error("value is too large")]
    Overflow,
}

impl FromStr for Money {
    type Err = MoneyParseError;

    /// Parses a non-negative decimal with up to two fractional digits.
    ///
    /// Accepts `"10"`, `"10.5"`, `"10.50"`. Rejects signs, exponents,
    /// `"10."`, `".5"` and anything with three or more fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        if s.starts_with('-') {
            return Err(MoneyParseError::Negative);
        }

        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (s, None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError::Invalid);
        }

        let fraction_cents = match fraction {
            None => 0,
            Some(f) if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) => {
                return Err(MoneyParseError::Invalid)
            }
            Some(f) if f.len() > 2 => return Err(MoneyParseError::TooManyDecimals),
            Some(f) => {
                let digits: i64 = f.parse().map_err(|_| MoneyParseError::Invalid)?;
                if f.len() == 1 {
                    digits * 10
                } else {
                    digits
                }
            }
        };

        let whole: i64 = whole.parse().map_err(|_| MoneyParseError::Overflow)?;
        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .map(Money)
            .ok_or(MoneyParseError::Overflow)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(2350).to_string(), "23.50");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(0).to_decimal_string(), "0.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_parse_accepts_up_to_two_decimals() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("10.05".parse::<Money>().unwrap().cents(), 1005);
        assert_eq!(" 3.50 ".parse::<Money>().unwrap().cents(), 350);
        assert_eq!("0.00".parse::<Money>().unwrap(), Money::zero());
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!("".parse::<Money>(), Err(MoneyParseError::Empty));
        assert_eq!("-1.00".parse::<Money>(), Err(MoneyParseError::Negative));
        assert_eq!("1.234".parse::<Money>(), Err(MoneyParseError::TooManyDecimals));
        assert_eq!("+1".parse::<Money>(), Err(MoneyParseError::Invalid));
        assert_eq!("1.".parse::<Money>(), Err(MoneyParseError::Invalid));
        assert_eq!(".5".parse::<Money>(), Err(MoneyParseError::Invalid));
        assert_eq!("1e3".parse::<Money>(), Err(MoneyParseError::Invalid));
        assert_eq!(
            "99999999999999999999".parse::<Money>(),
            Err(MoneyParseError::Overflow)
        );
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        assert_eq!(a.checked_mul_quantity(2), Some(Money::from_cents(2000)));
        assert_eq!(
            a.checked_add(Money::from_cents(350)),
            Some(Money::from_cents(1350))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_mul_quantity(2), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(a), None);
    }

    #[test]
    fn test_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(1099)).unwrap();
        assert_eq!(json, "1099");
    }
}
