//! # Checkout Loader
//!
//! Fetches everything the checkout view needs, concurrently.
//!
//! ```text
//!              ┌── GET /events/{id} ───────── required ──┐
//! load_checkout├── GET /points/my-points ──── optional ──┼──► CheckoutState
//!              └── GET /users/me/coupons ──── optional ──┘
//! ```
//!
//! Points and coupons are nice-to-have: if either fails the checkout still
//! opens with a zero balance or no coupons.

use chrono::{DateTime, Utc};
use evently_core::checkout::CheckoutState;
use evently_core::money::Money;
use tracing::{info, warn};

use crate::api::CheckoutApi;
use crate::error::ClientResult;

/// Loads a checkout for `event_id`, using `now` to drop expired points.
pub async fn load_checkout<A: CheckoutApi>(
    api: &A,
    event_id: &str,
    now: DateTime<Utc>,
) -> ClientResult<CheckoutState> {
    let (event, points, coupons) =
        tokio::join!(api.get_event(event_id), api.my_points(), api.my_coupons());

    let event = event?;

    let balance = match points {
        Ok(summary) => summary.balance_at(now),
        Err(e) => {
            warn!(event_id, error = %e, "Failed to load points, continuing with zero balance");
            Money::zero()
        }
    };

    let coupons = match coupons {
        Ok(coupons) => coupons,
        Err(e) => {
            warn!(event_id, error = %e, "Failed to load coupons, continuing without coupons");
            Vec::new()
        }
    };

    info!(
        event_id,
        ticket_types = event.ticket_types.len(),
        promotions = event.promotions.len(),
        coupons = coupons.len(),
        point_balance = balance.rupiah(),
        "Checkout loaded"
    );

    Ok(CheckoutState::new(&event, coupons, balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_loads_everything() {
        let api = FakeApi::new();
        let state = load_checkout(&api, "7", now()).await.unwrap();

        assert_eq!(state.event_id(), "7");
        assert_eq!(state.ticket_types().len(), 2);
        assert_eq!(state.coupons().len(), 1);
        assert_eq!(state.point_balance().rupiah(), 30_000);
    }

    #[tokio::test]
    async fn test_optional_failures_degrade() {
        let api = FakeApi::new().failing_points().failing_coupons();
        let state = load_checkout(&api, "7", now()).await.unwrap();

        assert_eq!(state.point_balance(), Money::zero());
        assert!(state.coupons().is_empty());
    }

    #[tokio::test]
    async fn test_event_failure_is_an_error() {
        let api = FakeApi::new();
        let err = load_checkout(&api, "404", now()).await.unwrap_err();
        assert_eq!(err.remote().map(|r| r.status), Some(404));
    }
}
