//! # Money Module
//!
//! Provides the `Money` type for handling Rupiah amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    100000 × 0.07 = 7000.000000000001  ❌ WRONG!                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Rupiah + basis points                            │
//! │    100000 × 700 bps / 10000 = 7000                                      │
//! │    Rounding happens once, explicitly, half-up                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rupiah has no minor unit in circulation, so one `Money` unit is one
//! Rupiah. Loyalty points redeem 1:1 against this unit.
//!
//! ## Usage
//! ```rust
//! use evently_core::money::{Money, Percentage};
//!
//! let price = Money::from_rupiah(50_000);
//! let subtotal = price * 2;
//! assert_eq!(subtotal.rupiah(), 100_000);
//!
//! let discount = subtotal.percentage_of(Percentage::from_bps(1000)); // 10%
//! assert_eq!(discount.rupiah(), 10_000);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole Rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: Subtraction stays well-defined; pricing clamps keep
///   results non-negative
/// - **Saturating arithmetic**: Server data is untrusted; an absurd price
///   times a quantity pins at `i64::MAX` instead of panicking or wrapping
/// - **Transparent serde**: Serialized as a bare JSON number, the shape the
///   REST API uses for `price`, `discount_amount`, `final_amount`
/// - **Lenient input**: The API occasionally sends `50000.0`; fractional
///   input is rounded to the nearest Rupiah on the way in
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  TicketType.price ──► SelectionLine × qty ──► PricingResult.subtotal    │
/// │                                                    │                    │
/// │  Promotion / Coupon amount ──► discount_amount ◄───┤                    │
/// │                                                    │                    │
/// │  PointsSummary.total_balance ──► points_applied ◄──┘                    │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole Rupiah.
    ///
    /// ## Example
    /// ```rust
    /// use evently_core::money::Money;
    ///
    /// let price = Money::from_rupiah(75_000);
    /// assert_eq!(price.rupiah(), 75_000);
    /// ```
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in whole Rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
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

    /// Multiplies money by a ticket quantity.
    ///
    /// ## Example
    /// ```rust
    /// use evently_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(50_000);
    /// assert_eq!(unit_price.multiply_quantity(3).rupiah(), 150_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `percentage` of this amount, rounded half-up.
    ///
    /// ## Implementation
    /// Integer math on basis points: `(amount * bps + 5000) / 10000`.
    /// i128 keeps large subtotals with adversarial percentages from
    /// overflowing.
    ///
    /// ## Example
    /// ```rust
    /// use evently_core::money::{Money, Percentage};
    ///
    /// let subtotal = Money::from_rupiah(99_999);
    /// let discount = subtotal.percentage_of(Percentage::from_bps(1250)); // 12.5%
    /// assert_eq!(discount.rupiah(), 12_500); // 12499.875 → 12500
    /// ```
    pub fn percentage_of(&self, percentage: Percentage) -> Money {
        let amount = (self.0 as i128 * percentage.bps() as i128 + 5000) / 10000;
        Money(amount.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Subtraction that never goes below zero.
    #[inline]
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// Clamps negative values to zero.
    #[inline]
    pub fn non_negative(self) -> Money {
        Money(self.0.max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the Indonesian convention: `Rp 1.250.000`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, grouped)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Decimal columns sometimes arrive as strings ("50000.00").
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Number(f64),
            Text(String),
        }

        let raw = match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(n) => n,
            RawAmount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid money amount: {}", s)))?,
        };
        if !raw.is_finite() {
            return Err(serde::de::Error::custom("money amount must be finite"));
        }
        Ok(Money(raw.round() as i64))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Percentage
// =============================================================================

/// A discount percentage in basis points.
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. The API sends `discount_percentage` as a JSON
/// number that may be fractional (`12.5`). Storing `1250` keeps every
/// calculation in integers.
///
/// Values above 100% are representable on purpose: organizers can type
/// anything, and the pricing calculator clamps the resulting discount to
/// the subtotal instead of rejecting the promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percentage(u32);

impl Percentage {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from a whole or fractional percent value.
    ///
    /// Negative and non-finite input becomes zero.
    pub fn from_percent(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Percentage(0);
        }
        Percentage((pct * 100.0).round().min(u32::MAX as f64) as u32)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percent (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}%", self.percent())
        }
    }
}

impl Serialize for Percentage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.percent())
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Ok(Percentage::from_percent(raw))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
