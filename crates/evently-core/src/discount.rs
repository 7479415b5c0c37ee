//! # Discounts
//!
//! The three ways a customer can reduce a checkout total, and the rule that
//! only one of them is ever active.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     DiscountSource (exactly one)                        │
//! │                                                                         │
//! │   None ──► Promotion(code, rule)   event-wide, set by the organizer     │
//! │     │                                                                   │
//! │     ├──► Coupon(code, rule)        per user, e.g. referral reward       │
//! │     │                                                                   │
//! │     └──► Points(balance)           loyalty balance, 1 point = Rp 1      │
//! │                                                                         │
//! │   Selecting any variant replaces whatever was there before.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::{Money, Percentage};

// =============================================================================
// Discount Rule
// =============================================================================

/// How much a promotion or coupon takes off.
///
/// When both fields are present and non-zero the percentage wins, matching
/// how organizers' promotions are displayed ("10% off").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscountRule {
    pub percentage: Option<Percentage>,
    pub fixed_amount: Option<Money>,
}

impl DiscountRule {
    pub fn new(percentage: Option<Percentage>, fixed_amount: Option<Money>) -> Self {
        DiscountRule {
            percentage,
            fixed_amount,
        }
    }

    pub fn percent(percentage: Percentage) -> Self {
        DiscountRule::new(Some(percentage), None)
    }

    pub fn fixed(amount: Money) -> Self {
        DiscountRule::new(None, Some(amount))
    }

    /// Discount for `subtotal`, clamped to `[0, subtotal]`.
    ///
    /// A rule with neither a percentage nor an amount is a no-op, not an
    /// error.
    ///
    /// ## Example
    /// ```rust
    /// use evently_core::discount::DiscountRule;
    /// use evently_core::money::{Money, Percentage};
    ///
    /// let subtotal = Money::from_rupiah(100_000);
    /// assert_eq!(DiscountRule::percent(Percentage::from_bps(1000)).amount_for(subtotal).rupiah(), 10_000);
    /// assert_eq!(DiscountRule::fixed(Money::from_rupiah(150_000)).amount_for(subtotal).rupiah(), 100_000);
    /// ```
    pub fn amount_for(&self, subtotal: Money) -> Money {
        let subtotal = subtotal.non_negative();
        let raw = match (self.percentage, self.fixed_amount) {
            (Some(pct), _) if !pct.is_zero() => subtotal.percentage_of(pct),
            (_, Some(amount)) if amount.is_positive() => amount,
            _ => Money::zero(),
        };
        raw.non_negative().min(subtotal)
    }

    /// True when the rule can never discount anything.
    pub fn is_noop(&self) -> bool {
        let no_pct = self.percentage.map_or(true, |p| p.is_zero());
        let no_amount = self.fixed_amount.map_or(true, |a| !a.is_positive());
        no_pct && no_amount
    }

    /// Short description, e.g. `10% off` or `Rp 25.000 off`.
    pub fn describe(&self) -> String {
        match (self.percentage, self.fixed_amount) {
            (Some(pct), _) if !pct.is_zero() => format!("{} off", pct),
            (_, Some(amount)) if amount.is_positive() => format!("{} off", amount),
            _ => "no discount".to_string(),
        }
    }
}

// =============================================================================
// Discount Source
// =============================================================================

/// A code-based discount chosen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCode {
    /// Id of the promotion or coupon it came from.
    pub id: String,
    /// Code sent to the server as `promotion_code` / `coupon_code`.
    pub code: String,
    pub rule: DiscountRule,
}

/// The single active discount of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountSource {
    #[default]
    None,
    Promotion(AppliedCode),
    Coupon(AppliedCode),
    Points { balance: Money },
}

impl DiscountSource {
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, DiscountSource::None)
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        matches!(self, DiscountSource::Promotion(_))
    }

    #[inline]
    pub fn is_coupon(&self) -> bool {
        matches!(self, DiscountSource::Coupon(_))
    }

    #[inline]
    pub fn uses_points(&self) -> bool {
        matches!(self, DiscountSource::Points { .. })
    }

    /// The promotion code, if a promotion is active.
    pub fn promotion_code(&self) -> Option<&str> {
        match self {
            DiscountSource::Promotion(applied) => Some(&applied.code),
            _ => None,
        }
    }

    /// The coupon code, if a coupon is active.
    pub fn coupon_code(&self) -> Option<&str> {
        match self {
            DiscountSource::Coupon(applied) => Some(&applied.code),
            _ => None,
        }
    }

    /// The rule of the active promotion or coupon.
    pub fn code_rule(&self) -> Option<&DiscountRule> {
        match self {
            DiscountSource::Promotion(applied) | DiscountSource::Coupon(applied) => {
                Some(&applied.rule)
            }
            _ => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
