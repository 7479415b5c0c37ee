//! # Checkout API Seam
//!
//! The four calls the checkout flow needs, behind a trait so the loader and
//! submitter can run against [`crate::http::HttpApi`] or an in-memory fake.

use std::future::Future;

use evently_core::types::{Coupon, Event, PointsSummary, Transaction};

use crate::error::ClientResult;
use crate::protocol::CreateTransactionRequest;

pub trait CheckoutApi: Send + Sync {
    /// `GET /events/{id}`
    fn get_event(&self, event_id: &str) -> impl Future<Output = ClientResult<Event>> + Send;

    /// `GET /users/me/coupons`
    fn my_coupons(&self) -> impl Future<Output = ClientResult<Vec<Coupon>>> + Send;

    /// `GET /points/my-points`
    fn my_points(&self) -> impl Future<Output = ClientResult<PointsSummary>> + Send;

    /// `POST /transactions`, sent exactly once.
    fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> impl Future<Output = ClientResult<Transaction>> + Send;
}
