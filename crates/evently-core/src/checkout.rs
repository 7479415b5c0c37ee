//! # Checkout State
//!
//! The ephemeral state behind the checkout view and the pure reducer that
//! moves it forward.
//!
//! ## State Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  apply_event(state, event) -> state                     │
//! │                                                                         │
//! │  User Action              CheckoutEvent              State Change       │
//! │  ───────────              ─────────────              ────────────       │
//! │                                                                         │
//! │  Click + / − ──────────► ChangeQuantity ──────────► quantity clamped    │
//! │                                                      to [0, available]  │
//! │                                                                         │
//! │  Pick promotion ───────► SelectPromotion ─────────► coupon/points off   │
//! │  Pick coupon ──────────► SelectCoupon ────────────► promotion/points off│
//! │  Toggle points ────────► SetUsePoints ────────────► promotion/coupon off│
//! │  Reset ────────────────► ClearDiscount ───────────► no discount         │
//! │                                                                         │
//! │  Pay Now ──────────────► SubmitStarted ───────────► in flight           │
//! │  Server error ─────────► SubmitFailed ────────────► message kept,       │
//! │                                                      cart preserved     │
//! │  Server ok ────────────► SubmitSucceeded ─────────► cart discarded      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Selecting something that cannot apply (points with a zero balance, a
//! coupon the server marked invalid, an increment past availability) leaves
//! the state untouched. None of these are errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::discount::{AppliedCode, DiscountSource};
use crate::error::CoreResult;
use crate::money::Money;
use crate::pricing::{self, PricingResult, SelectionLine};
use crate::types::{Coupon, Event, Promotion, TicketType, TransactionRef};
use crate::validation;

// =============================================================================
// Submission Status
// =============================================================================

/// Where the checkout is in the submit round trip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    /// Request sent, submit control disabled.
    InFlight,
    /// Last attempt failed; the server's message verbatim.
    Failed { message: String },
    /// Transaction created; the checkout is finished.
    Succeeded { transaction: TransactionRef },
}

impl SubmissionStatus {
    #[inline]
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionStatus::InFlight)
    }
}

// =============================================================================
// Events
// =============================================================================

/// Everything that can happen to a checkout.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutEvent {
    ChangeQuantity { ticket_type_id: String, delta: i64 },
    /// `None` deselects the promotion if it is the active discount.
    SelectPromotion(Option<Promotion>),
    /// `None` deselects the coupon if it is the active discount.
    SelectCoupon(Option<Coupon>),
    SetUsePoints(bool),
    ClearDiscount,
    SubmitStarted,
    SubmitFailed { message: String },
    SubmitSucceeded(TransactionRef),
}

// =============================================================================
// Checkout State
// =============================================================================

/// Checkout state for one event.
///
/// Seeded from the fetched event, the user's coupons and point balance.
/// Discarded on navigation away or after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutState {
    event_id: String,
    ticket_types: Vec<TicketType>,
    promotions: Vec<Promotion>,
    coupons: Vec<Coupon>,
    point_balance: Money,
    quantities: BTreeMap<String, i64>,
    discount: DiscountSource,
    submission: SubmissionStatus,
}

impl CheckoutState {
    /// Creates an empty checkout for `event`.
    pub fn new(event: &Event, coupons: Vec<Coupon>, point_balance: Money) -> Self {
        CheckoutState {
            event_id: event.id.clone(),
            ticket_types: event.ticket_types.clone(),
            promotions: event.promotions.clone(),
            coupons,
            point_balance: point_balance.non_negative(),
            quantities: BTreeMap::new(),
            discount: DiscountSource::None,
            submission: SubmissionStatus::Idle,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn ticket_types(&self) -> &[TicketType] {
        &self.ticket_types
    }

    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    pub fn point_balance(&self) -> Money {
        self.point_balance
    }

    pub fn discount(&self) -> &DiscountSource {
        &self.discount
    }

    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    /// Current quantity for a ticket type (0 when never touched).
    pub fn quantity(&self, ticket_type_id: &str) -> i64 {
        self.quantities.get(ticket_type_id).copied().unwrap_or(0)
    }

    /// Looks up a promotion of this event by code (case-insensitive).
    pub fn promotion_by_code(&self, code: &str) -> Option<&Promotion> {
        let code = code.trim();
        self.promotions
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
    }

    /// Looks up one of the user's coupons by code (case-insensitive).
    pub fn coupon_by_code(&self, code: &str) -> Option<&Coupon> {
        let code = code.trim();
        self.coupons.iter().find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// The cart: lines with quantity > 0, in the event's ticket type order.
    pub fn lines(&self) -> Vec<SelectionLine> {
        self.ticket_types
            .iter()
            .filter_map(|t| {
                let quantity = self.quantity(&t.id);
                (quantity > 0).then(|| SelectionLine {
                    ticket_type_id: t.id.clone(),
                    quantity,
                })
            })
            .collect()
    }

    pub fn is_cart_empty(&self) -> bool {
        self.quantities.values().all(|&q| q <= 0)
    }

    /// The order summary for the current selection.
    pub fn pricing(&self) -> PricingResult {
        pricing::calculate(&self.lines(), &self.ticket_types, &self.discount)
    }

    /// Whether "Pay Now" is enabled.
    pub fn can_submit(&self) -> bool {
        !self.submission.is_in_flight() && self.pricing().is_submittable()
    }

    /// Points the request should redeem, only when points are the active
    /// discount and actually cover something.
    pub fn points_to_use(&self) -> Option<Money> {
        let applied = self.pricing().points_applied;
        (self.discount.uses_points() && applied.is_positive()).then_some(applied)
    }

    /// Checks the cart before anything is sent.
    ///
    /// ## Errors
    /// - `CoreError::EmptyCart` when no line has quantity > 0
    /// - `CoreError::QuantityExceedsAvailability` when a line is above the
    ///   mirrored inventory
    pub fn validate_for_submit(&self) -> CoreResult<Vec<SelectionLine>> {
        let lines = self.lines();
        validation::validate_cart(&lines, &self.ticket_types)?;
        Ok(lines)
    }

    fn ticket_type(&self, id: &str) -> Option<&TicketType> {
        self.ticket_types.iter().find(|t| t.id == id)
    }

    // =========================================================================
    // Quantity Selector
    // =========================================================================

    /// Adds `delta` to a ticket type's quantity and returns the new value.
    ///
    /// ## Behavior
    /// - Decrements stop at 0
    /// - An increment past `available_quantity` is ignored (unchanged)
    /// - Unknown ticket type ids are ignored and report 0
    pub fn set_quantity(&mut self, ticket_type_id: &str, delta: i64) -> i64 {
        let Some(available) = self.ticket_type(ticket_type_id).map(TicketType::available) else {
            return 0;
        };

        let current = self.quantity(ticket_type_id);
        let requested = current.saturating_add(delta).max(0);
        if requested > available {
            return current;
        }

        if requested == 0 {
            self.quantities.remove(ticket_type_id);
        } else {
            self.quantities.insert(ticket_type_id.to_string(), requested);
        }
        requested
    }

    // =========================================================================
    // Discount Selector
    // =========================================================================

    /// Makes `promotion` the active discount, dropping any coupon or points.
    ///
    /// `None` clears the promotion if it is active. Promotions not offered
    /// on this event are ignored.
    pub fn select_promotion(&mut self, promotion: Option<&Promotion>) {
        match promotion {
            None => {
                if self.discount.is_promotion() {
                    self.discount = DiscountSource::None;
                }
            }
            Some(promotion) => {
                if !self.promotions.iter().any(|p| p.id == promotion.id) {
                    return;
                }
                self.discount = DiscountSource::Promotion(AppliedCode {
                    id: promotion.id.clone(),
                    code: promotion.code.clone(),
                    rule: promotion.rule(),
                });
            }
        }
    }

    /// Makes `coupon` the active discount, dropping any promotion or points.
    ///
    /// `None` clears the coupon if it is active. Coupons that are not the
    /// user's or are not redeemable are ignored.
    pub fn select_coupon(&mut self, coupon: Option<&Coupon>) {
        match coupon {
            None => {
                if self.discount.is_coupon() {
                    self.discount = DiscountSource::None;
                }
            }
            Some(coupon) => {
                if !coupon.is_redeemable() || !self.coupons.iter().any(|c| c.id == coupon.id) {
                    return;
                }
                self.discount = DiscountSource::Coupon(AppliedCode {
                    id: coupon.id.clone(),
                    code: coupon.code.clone(),
                    rule: coupon.rule(),
                });
            }
        }
    }

    /// Turns point redemption on or off. Returns whether points are now used.
    ///
    /// Enabling with a zero balance is a no-op.
    pub fn select_points(&mut self, enabled: bool) -> bool {
        if enabled {
            if self.point_balance.is_positive() {
                self.discount = DiscountSource::Points {
                    balance: self.point_balance,
                };
            }
        } else if self.discount.uses_points() {
            self.discount = DiscountSource::None;
        }
        self.discount.uses_points()
    }

    /// Removes whatever discount is active.
    pub fn clear_discount(&mut self) {
        self.discount = DiscountSource::None;
    }

    // =========================================================================
    // Reducer
    // =========================================================================

    /// Applies one event in place.
    pub fn apply(&mut self, event: CheckoutEvent) {
        match event {
            CheckoutEvent::ChangeQuantity {
                ticket_type_id,
                delta,
            } => {
                self.set_quantity(&ticket_type_id, delta);
            }
            CheckoutEvent::SelectPromotion(promotion) => self.select_promotion(promotion.as_ref()),
            CheckoutEvent::SelectCoupon(coupon) => self.select_coupon(coupon.as_ref()),
            CheckoutEvent::SetUsePoints(enabled) => {
                self.select_points(enabled);
            }
            CheckoutEvent::ClearDiscount => self.clear_discount(),
            CheckoutEvent::SubmitStarted => {
                if self.can_submit() {
                    self.submission = SubmissionStatus::InFlight;
                }
            }
            CheckoutEvent::SubmitFailed { message } => {
                self.submission = SubmissionStatus::Failed { message };
            }
            CheckoutEvent::SubmitSucceeded(transaction) => {
                self.quantities.clear();
                self.discount = DiscountSource::None;
                self.submission = SubmissionStatus::Succeeded { transaction };
            }
        }
    }
}

/// Pure reducer: returns the state after `event`.
///
/// ## Example
/// ```rust
/// use evently_core::checkout::{apply_event, CheckoutEvent, CheckoutState};
/// use evently_core::money::Money;
/// # use evently_core::types::{Event, TicketType};
/// # let event: Event = serde_json::from_str(r#"{"id": 1, "name": "Gig",
/// #   "start_date": "2026-11-01T19:00:00Z",
/// #   "ticket_types": [{"id": "a", "name": "Regular", "price": 50000, "available_quantity": 5}]}"#).unwrap();
///
/// let state = CheckoutState::new(&event, vec![], Money::zero());
/// let state = apply_event(state, CheckoutEvent::ChangeQuantity { ticket_type_id: "a".into(), delta: 2 });
/// assert_eq!(state.pricing().subtotal.rupiah(), 100_000);
/// ```
pub fn apply_event(mut state: CheckoutState, event: CheckoutEvent) -> CheckoutState {
    state.apply(event);
    state
}

// =============================================================================
// Unit Tests
// =============================================================================
