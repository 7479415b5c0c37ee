//! # Checkout Commands
//!
//! ## Checkout Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  load_checkout ──► apply_selection ──► summary ──► submit_checkout     │
//! │  (event, points,   (reducer events:    (quote      (checkout only,     │
//! │   coupons)          quantities,         stops       one POST)          │
//! │                     one discount)       here)                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use evently_client::protocol::CouponCheck;
use evently_client::{load_checkout, CheckoutApi, TransactionSubmitter};
use evently_core::checkout::{apply_event, CheckoutEvent, CheckoutState};
use evently_core::discount::DiscountSource;
use evently_core::pricing::{PricingResult, SelectionLine};
use evently_core::types::TransactionRef;
use evently_core::{CoreError, Money};
use serde::Serialize;
use tracing::debug;

use crate::cli::SelectionArgs;
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::render;

#[derive(Debug, Serialize)]
struct Quote<'a> {
    event_id: &'a str,
    lines: Vec<SelectionLine>,
    discount: &'a DiscountSource,
    point_balance: Money,
    pricing: PricingResult,
}

impl<'a> Quote<'a> {
    fn of(state: &'a CheckoutState) -> Self {
        Quote {
            event_id: state.event_id(),
            lines: state.lines(),
            discount: state.discount(),
            point_balance: state.point_balance(),
            pricing: state.pricing(),
        }
    }
}

/// Feeds the command line selection through the checkout reducer.
///
/// Anything the reducer would silently ignore is reported instead: unknown
/// ticket types, quantities over availability, unknown or unusable codes.
pub(crate) fn apply_selection(
    mut state: CheckoutState,
    args: &SelectionArgs,
) -> CliResult<CheckoutState> {
    for ticket in &args.tickets {
        let before = state.quantity(&ticket.ticket_type_id);
        state = apply_event(
            state,
            CheckoutEvent::ChangeQuantity {
                ticket_type_id: ticket.ticket_type_id.clone(),
                delta: ticket.quantity,
            },
        );
        if state.quantity(&ticket.ticket_type_id) != before {
            continue;
        }

        let ticket_type = state
            .ticket_types()
            .iter()
            .find(|t| t.id == ticket.ticket_type_id)
            .ok_or_else(|| CoreError::TicketTypeNotFound(ticket.ticket_type_id.clone()))?;
        return Err(CoreError::QuantityExceedsAvailability {
            ticket_type: ticket_type.name.clone(),
            available: ticket_type.available(),
            requested: before + ticket.quantity,
        }
        .into());
    }

    if let Some(code) = &args.promo {
        let promotion = state
            .promotion_by_code(code)
            .cloned()
            .ok_or_else(|| CliError::not_found("Promotion", code))?;
        state = apply_event(state, CheckoutEvent::SelectPromotion(Some(promotion)));
    }

    if let Some(code) = &args.coupon {
        let coupon = state
            .coupon_by_code(code)
            .cloned()
            .ok_or_else(|| CliError::not_found("Coupon", code))?;
        state = apply_event(state, CheckoutEvent::SelectCoupon(Some(coupon)));
        if !state.discount().is_coupon() {
            return Err(CliError::validation(format!("Coupon {} can no longer be used", code)));
        }
    }

    if args.points {
        state = apply_event(state, CheckoutEvent::SetUsePoints(true));
        if !state.discount().uses_points() {
            return Err(CliError::validation("You have no points to redeem"));
        }
    }

    Ok(state)
}

/// `evently quote`: prices the selection, sends nothing.
pub async fn quote(ctx: &AppContext, args: SelectionArgs) -> CliResult<()> {
    let state = load_checkout(&ctx.api, &args.event_id, Utc::now()).await?;
    let state = apply_selection(state, &args)?;
    debug!(event_id = %args.event_id, subtotal = state.pricing().subtotal.rupiah(), "Quote computed");

    ctx.output
        .emit(&Quote::of(&state), || render::pricing_summary(&state))
}

/// `evently checkout`: prices the selection and creates the transaction.
pub async fn checkout(ctx: &AppContext, args: SelectionArgs) -> CliResult<()> {
    ctx.require_login().await?;

    let state = load_checkout(&ctx.api, &args.event_id, Utc::now()).await?;
    let mut state = apply_selection(state, &args)?;
    state.validate_for_submit()?;

    if !ctx.output.json {
        println!("{}\n", render::pricing_summary(&state));
    }

    let submitter = TransactionSubmitter::new(ctx.api.clone());
    let reference: TransactionRef = submitter.submit_checkout(&mut state).await?;

    ctx.output.emit(&reference, || {
        format!(
            "Transaction created: {}\nSee `evently transactions show {} --watch` for the payment deadline",
            reference.invoice_number, reference.id
        )
    })
}

/// `evently coupon CODE`
pub async fn check_coupon(ctx: &AppContext, code: &str) -> CliResult<()> {
    ctx.require_login().await?;
    let check: CouponCheck = ctx.api.check_coupon(code).await?;

    ctx.output.emit(&check, || match (&check.coupon, check.valid) {
        (Some(coupon), true) => format!("{} is valid: {}", coupon.code, coupon.rule().describe()),
        _ => format!("Coupon {} cannot be used", code.trim()),
    })
}

/// `evently points`
pub async fn points(ctx: &AppContext, history: bool) -> CliResult<()> {
    ctx.require_login().await?;
    let now = Utc::now();

    if history {
        let entries = ctx.api.points_history().await?;
        return ctx.output.emit(&entries, || render::point_history(&entries, now));
    }

    let summary = ctx.api.my_points().await?;
    ctx.output.emit(&summary, || render::points(&summary, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_ticket_spec;
    use crate::error::ErrorCode;
    use evently_core::types::{Coupon, Event};

    fn state() -> CheckoutState {
        let event: Event = serde_json::from_str(
            r#"{"id": 7, "name": "Jazz Night", "start_date": "2026-11-01T19:00:00Z",
                "ticket_types": [
                    {"id": 11, "name": "Regular", "price": 50000, "available_quantity": 40},
                    {"id": 12, "name": "VIP", "price": 250000, "available_quantity": 2}
                ],
                "promotions": [{"id": 3, "code": "EARLY10", "discount_percentage": 10}]}"#,
        )
        .unwrap();
        let coupons: Vec<Coupon> = serde_json::from_str(
            r#"[{"id": "c-1", "code": "REF-RINA01", "discount_amount": 25000},
                {"id": "c-2", "code": "USED-01", "discount_amount": 25000, "is_used": true}]"#,
        )
        .unwrap();
        CheckoutState::new(&event, coupons, Money::from_rupiah(30_000))
    }

    fn args(tickets: &[&str]) -> SelectionArgs {
        SelectionArgs {
            event_id: "7".into(),
            tickets: tickets.iter().map(|t| parse_ticket_spec(t).unwrap()).collect(),
            promo: None,
            coupon: None,
            points: false,
        }
    }

    #[test]
    fn test_quantities_and_promotion() {
        let mut a = args(&["11=2", "12=1"]);
        a.promo = Some("early10".into());

        let state = apply_selection(state(), &a).unwrap();
        assert_eq!(state.pricing().subtotal.rupiah(), 350_000);
        assert_eq!(state.pricing().discount_amount.rupiah(), 35_000);
        assert_eq!(state.pricing().final_total.rupiah(), 315_000);
    }

    #[test]
    fn test_over_availability_is_reported() {
        let err = apply_selection(state(), &args(&["12=3"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("VIP"));
    }

    #[test]
    fn test_unknown_ticket_type() {
        let err = apply_selection(state(), &args(&["99=1"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_repeated_ticket_accumulates() {
        let state = apply_selection(state(), &args(&["11=1", "11=2"])).unwrap();
        assert_eq!(state.quantity("11"), 3);
    }

    #[test]
    fn test_used_coupon_rejected() {
        let mut a = args(&["11=1"]);
        a.coupon = Some("USED-01".into());
        let err = apply_selection(state(), &a).unwrap_err();
        assert_eq!(err.message, "Coupon USED-01 can no longer be used");

        a.coupon = Some("NOPE".into());
        assert_eq!(apply_selection(state(), &a).unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_points_cover_up_to_subtotal() {
        let mut a = args(&["11=1"]);
        a.points = true;
        let state = apply_selection(state(), &a).unwrap();
        let pricing = state.pricing();
        assert_eq!(pricing.points_applied.rupiah(), 30_000);
        assert_eq!(pricing.final_total.rupiah(), 20_000);
        assert!(pricing.discount_amount.is_zero());
    }
}
