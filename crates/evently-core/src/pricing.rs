//! # Pricing Calculator
//!
//! Derives the order summary shown next to the "Pay Now" button.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. subtotal = Σ unit_price × quantity                                  │
//! │                                                                         │
//! │  2. Promotion / Coupon active?                                          │
//! │       discount = pct ? subtotal × pct : fixed      (clamped ≤ subtotal) │
//! │       points   = 0                                                      │
//! │                                                                         │
//! │  3. Else points enabled?                                                │
//! │       points   = min(balance, subtotal)                                 │
//! │       discount = 0                                                      │
//! │                                                                         │
//! │  4. final_total = subtotal − discount − points   (never negative)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recomputed on every state change, never persisted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::DiscountSource;
use crate::money::Money;
use crate::types::TicketType;

/// Requested quantity of one ticket type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectionLine {
    pub ticket_type_id: String,
    pub quantity: i64,
}

/// Breakdown of a checkout total.
///
/// ## Invariants
/// - every field is ≥ 0
/// - `final_total = subtotal − discount_amount − points_applied`
/// - at most one of `discount_amount` / `points_applied` is non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub points_applied: Money,
    pub final_total: Money,
}

impl PricingResult {
    /// Submission is only possible with something in the cart.
    #[inline]
    pub fn is_submittable(&self) -> bool {
        self.subtotal.is_positive()
    }
}

/// Sums `unit_price × quantity` over the lines.
///
/// Lines whose ticket type is unknown, or whose quantity is not positive,
/// contribute nothing.
pub fn subtotal(lines: &[SelectionLine], ticket_types: &[TicketType]) -> Money {
    lines
        .iter()
        .filter(|line| line.quantity > 0)
        .filter_map(|line| {
            ticket_types
                .iter()
                .find(|t| t.id == line.ticket_type_id)
                .map(|t| t.price.non_negative().multiply_quantity(line.quantity))
        })
        .sum()
}

/// Computes the full breakdown for a cart and its discount selection.
///
/// ## Example
/// ```rust
/// use evently_core::discount::DiscountSource;
/// use evently_core::money::Money;
/// use evently_core::pricing::{calculate, SelectionLine};
/// use evently_core::types::TicketType;
///
/// let ticket = TicketType {
///     id: "a".into(),
///     name: "Regular".into(),
///     price: Money::from_rupiah(50_000),
///     quantity: None,
///     available_quantity: 10,
/// };
/// let lines = [SelectionLine { ticket_type_id: "a".into(), quantity: 2 }];
/// let points = DiscountSource::Points { balance: Money::from_rupiah(30_000) };
///
/// let result = calculate(&lines, &[ticket], &points);
/// assert_eq!(result.points_applied.rupiah(), 30_000);
/// assert_eq!(result.final_total.rupiah(), 70_000);
/// ```
pub fn calculate(
    lines: &[SelectionLine],
    ticket_types: &[TicketType],
    discount: &DiscountSource,
) -> PricingResult {
    let subtotal = subtotal(lines, ticket_types);
    price_subtotal(subtotal, discount)
}

/// Applies the discount selection to an already computed subtotal.
pub fn price_subtotal(subtotal: Money, discount: &DiscountSource) -> PricingResult {
    let subtotal = subtotal.non_negative();

    let (discount_amount, points_applied) = match discount {
        DiscountSource::Promotion(applied) | DiscountSource::Coupon(applied) => {
            (applied.rule.amount_for(subtotal), Money::zero())
        }
        DiscountSource::Points { balance } => {
            (Money::zero(), balance.non_negative().min(subtotal))
        }
        DiscountSource::None => (Money::zero(), Money::zero()),
    };

    PricingResult {
        subtotal,
        discount_amount,
        points_applied,
        final_total: subtotal.saturating_sub(discount_amount + points_applied),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::{AppliedCode, DiscountRule};
    use crate::money::Percentage;

    fn ticket(id: &str, price: i64, available: i64) -> TicketType {
        TicketType {
            id: id.to_string(),
            name: format!("Ticket {}", id),
            price: Money::from_rupiah(price),
            quantity: None,
            available_quantity: available,
        }
    }

    fn line(id: &str, quantity: i64) -> SelectionLine {
        SelectionLine {
            ticket_type_id: id.to_string(),
            quantity,
        }
    }

    fn cart() -> (Vec<SelectionLine>, Vec<TicketType>) {
        (vec![line("a", 2)], vec![ticket("a", 50_000, 10)])
    }

    fn code(rule: DiscountRule) -> AppliedCode {
        AppliedCode {
            id: "1".to_string(),
            code: "CODE".to_string(),
            rule,
        }
    }

    fn assert_invariants(r: &PricingResult) {
        assert!(!r.subtotal.is_negative());
        assert!(!r.discount_amount.is_negative());
        assert!(!r.points_applied.is_negative());
        assert!(!r.final_total.is_negative());
        assert_eq!(r.final_total, r.subtotal - r.discount_amount - r.points_applied);
        assert!(r.discount_amount <= r.subtotal);
    }

    #[test]
    fn test_no_discount() {
        let (lines, types) = cart();
        let r = calculate(&lines, &types, &DiscountSource::None);
        assert_eq!(r.subtotal.rupiah(), 100_000);
        assert_eq!(r.discount_amount.rupiah(), 0);
        assert_eq!(r.final_total.rupiah(), 100_000);
        assert_invariants(&r);
    }

    #[test]
    fn test_promotion_ten_percent() {
        let (lines, types) = cart();
        let promo = DiscountSource::Promotion(code(DiscountRule::percent(Percentage::from_bps(1000))));
        let r = calculate(&lines, &types, &promo);
        assert_eq!(r.discount_amount.rupiah(), 10_000);
        assert_eq!(r.final_total.rupiah(), 90_000);
        assert_invariants(&r);
    }

    #[test]
    fn test_coupon_fixed_amount_clamped() {
        let (lines, types) = cart();
        let coupon = DiscountSource::Coupon(code(DiscountRule::fixed(Money::from_rupiah(150_000))));
        let r = calculate(&lines, &types, &coupon);
        assert_eq!(r.discount_amount.rupiah(), 100_000);
        assert_eq!(r.final_total.rupiah(), 0);
        assert_invariants(&r);
    }

    #[test]
    fn test_points_partial_balance() {
        let (lines, types) = cart();
        let points = DiscountSource::Points {
            balance: Money::from_rupiah(30_000),
        };
        let r = calculate(&lines, &types, &points);
        assert_eq!(r.points_applied.rupiah(), 30_000);
        assert_eq!(r.discount_amount.rupiah(), 0);
        assert_eq!(r.final_total.rupiah(), 70_000);
        assert_invariants(&r);
    }

    #[test]
    fn test_points_capped_at_subtotal() {
        let (lines, types) = cart();
        let points = DiscountSource::Points {
            balance: Money::from_rupiah(250_000),
        };
        let r = calculate(&lines, &types, &points);
        assert_eq!(r.points_applied.rupiah(), 100_000);
        assert_eq!(r.final_total, Money::zero());
        assert_invariants(&r);
    }

    #[test]
    fn test_empty_cart_is_not_submittable() {
        let types = vec![ticket("a", 50_000, 10)];
        let points = DiscountSource::Points {
            balance: Money::from_rupiah(30_000),
        };
        let r = calculate(&[], &types, &points);
        assert_eq!(r, PricingResult::default());
        assert!(!r.is_submittable());
    }

    #[test]
    fn test_multiple_lines_and_unknown_ticket_type() {
        let types = vec![ticket("a", 50_000, 10), ticket("vip", 250_000, 2)];
        let lines = vec![line("a", 3), line("vip", 1), line("ghost", 4), line("a", 0)];
        assert_eq!(subtotal(&lines, &types).rupiah(), 400_000);
    }

    #[test]
    fn test_huge_prices_saturate_instead_of_overflowing() {
        let types = vec![ticket("a", 5_000_000_000_000_000_000, 10), ticket("b", 50_000, 10)];
        let lines = vec![line("a", 2), line("b", 3)];
        assert_eq!(subtotal(&lines, &types).rupiah(), i64::MAX);

        let sources = [
            DiscountSource::None,
            DiscountSource::Promotion(code(DiscountRule::percent(Percentage::from_bps(1000)))),
            DiscountSource::Coupon(code(DiscountRule::fixed(Money::from_rupiah(i64::MAX)))),
            DiscountSource::Points {
                balance: Money::from_rupiah(i64::MAX),
            },
        ];
        for source in &sources {
            let r = calculate(&lines, &types, source);
            assert_eq!(r.subtotal.rupiah(), i64::MAX);
            assert_invariants(&r);
        }
    }

    #[test]
    fn test_invariants_hold_across_inputs() {
        let types = vec![ticket("a", 35_000, 10), ticket("b", 0, 10)];
        let percentages = [0u32, 1, 333, 1000, 5000, 10_000, 15_000, 1_000_000];
        let amounts = [0i64, 1, 9_999, 35_000, 70_001, 10_000_000];

        for qty in 0..4 {
            let lines = vec![line("a", qty), line("b", 2)];
            for bps in percentages {
                let promo = DiscountSource::Promotion(code(DiscountRule::percent(Percentage::from_bps(bps))));
                assert_invariants(&calculate(&lines, &types, &promo));
            }
            for amount in amounts {
                let coupon = DiscountSource::Coupon(code(DiscountRule::fixed(Money::from_rupiah(amount))));
                assert_invariants(&calculate(&lines, &types, &coupon));

                let points = DiscountSource::Points {
                    balance: Money::from_rupiah(amount),
                };
                let r = calculate(&lines, &types, &points);
                assert_invariants(&r);
                assert!(r.points_applied <= Money::from_rupiah(amount).min(r.subtotal));
            }
        }
    }
}
