//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! Amounts are whole Chilean pesos stored as `i64`. The peso has no minor
//! unit in circulation, so one unit here is one peso; there is no cents
//! field and no floating point anywhere in a monetary computation.
//!
//! ## Usage
//! ```rust
//! use notaventa_core::money::Money;
//!
//! let price = Money::from_pesos(1990);
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.pesos(), 5970);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole Chilean pesos.
///
/// Signed so refunds and corrections can be represented; a single-field
/// tuple struct keeps it a zero-cost wrapper over `i64`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole pesos.
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the value in whole pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity (line total = unit price × quantity).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `$1.234.567` with dot thousands separators, the local convention.
///
/// For debugging and CLI output; any richer localization belongs to a
/// presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "{}${}", sign, grouped)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Summing an iterator of line totals yields the subtotal.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pesos() {
        let money = Money::from_pesos(1990);
        assert_eq!(money.pesos(), 1990);
    }

    #[test]
    fn test_display_grouping() {
        assert_eq!(format!("{}", Money::from_pesos(0)), "$0");
        assert_eq!(format!("{}", Money::from_pesos(990)), "$990");
        assert_eq!(format!("{}", Money::from_pesos(1990)), "$1.990");
        assert_eq!(format!("{}", Money::from_pesos(1234567)), "$1.234.567");
        assert_eq!(format!("{}", Money::from_pesos(-5500)), "-$5.500");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_pesos(1000);
        let b = Money::from_pesos(500);

        assert_eq!((a + b).pesos(), 1500);
        assert_eq!((a - b).pesos(), 500);
        assert_eq!(a.multiply_quantity(3).pesos(), 3000);
    }

    #[test]
    fn test_sum() {
        let lines = vec![
            Money::from_pesos(1000),
            Money::from_pesos(2500),
            Money::from_pesos(990),
        ];
        let subtotal: Money = lines.into_iter().sum();
        assert_eq!(subtotal.pesos(), 4490);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_pesos(100).is_positive());
        assert!(Money::from_pesos(-100).is_negative());
    }

    #[test]
    fn test_serde_transparent() {
        let money = Money::from_pesos(2000);
        assert_eq!(serde_json::to_string(&money).unwrap(), "2000");
        let back: Money = serde_json::from_str("2000").unwrap();
        assert_eq!(back, money);
    }
}
