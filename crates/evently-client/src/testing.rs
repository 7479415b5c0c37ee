//! In-memory [`CheckoutApi`] for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use evently_core::types::{Coupon, Event, PointsSummary, Transaction};
use tokio::sync::Notify;

use crate::api::CheckoutApi;
use crate::error::{ClientError, ClientResult, RemoteError};
use crate::protocol::CreateTransactionRequest;

const EVENT_JSON: &str = r#"{
    "id": 7,
    "name": "Jazz Night",
    "start_date": "2026-11-01T19:00:00Z",
    "city": "Jakarta",
    "ticket_types": [
        {"id": 11, "name": "Regular", "price": 50000, "available_quantity": 40},
        {"id": 12, "name": "VIP", "price": 250000, "available_quantity": 2}
    ],
    "promotions": [
        {"id": 3, "code": "EARLY10", "discount_percentage": 10, "discount_amount": null}
    ]
}"#;

const COUPONS_JSON: &str = r#"[
    {"id": "c-1", "code": "REF-RINA01", "discount_percentage": null, "discount_amount": 25000,
     "is_used": false, "is_expired": false, "is_valid": true}
]"#;

const POINTS_JSON: &str = r#"{"total_points": 30000, "points": [
    {"id": "p-1", "amount": 10000, "remaining_amount": 10000, "expires_at": "2027-01-01T00:00:00Z"},
    {"id": "p-2", "amount": 20000, "remaining_amount": 20000, "expires_at": "2027-02-01T00:00:00Z"}
]}"#;

fn remote(status: u16, message: &str) -> ClientError {
    ClientError::Remote(RemoteError {
        status,
        message: message.to_string(),
        field_errors: BTreeMap::new(),
    })
}

pub(crate) struct FakeApi {
    event: Event,
    coupons: Vec<Coupon>,
    points: PointsSummary,
    fail_points: bool,
    fail_coupons: bool,
    reject: Option<(u16, String)>,
    gate: Option<Arc<Notify>>,
    create_calls: AtomicUsize,
    last_request: Mutex<Option<CreateTransactionRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        FakeApi {
            event: serde_json::from_str(EVENT_JSON).unwrap(),
            coupons: serde_json::from_str(COUPONS_JSON).unwrap(),
            points: serde_json::from_str(POINTS_JSON).unwrap(),
            fail_points: false,
            fail_coupons: false,
            reject: None,
            gate: None,
            create_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing_points(mut self) -> Self {
        self.fail_points = true;
        self
    }

    pub fn failing_coupons(mut self) -> Self {
        self.fail_coupons = true;
        self
    }

    /// `create_transaction` answers with this error.
    pub fn rejecting(mut self, status: u16, message: &str) -> Self {
        self.reject = Some((status, message.to_string()));
        self
    }

    /// `create_transaction` waits for a notification before answering.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn coupons(&self) -> Vec<Coupon> {
        self.coupons.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CreateTransactionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl CheckoutApi for FakeApi {
    async fn get_event(&self, event_id: &str) -> ClientResult<Event> {
        if event_id == self.event.id {
            Ok(self.event.clone())
        } else {
            Err(remote(404, "Event not found"))
        }
    }

    async fn my_coupons(&self) -> ClientResult<Vec<Coupon>> {
        if self.fail_coupons {
            return Err(remote(500, "Internal server error"));
        }
        Ok(self.coupons.clone())
    }

    async fn my_points(&self) -> ClientResult<PointsSummary> {
        if self.fail_points {
            return Err(remote(503, "Service unavailable"));
        }
        Ok(self.points.clone())
    }

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> ClientResult<Transaction> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if let Some((status, message)) = &self.reject {
            return Err(remote(*status, message));
        }

        let json = serde_json::json!({
            "id": format!("t-{}", n),
            "event_id": request.event_id,
            "invoice_number": format!("INV-20261018-{:04}", n),
            "total_amount": 100000,
            "final_amount": 70000,
            "points_used": request.points_to_use.unwrap_or(0),
            "status": "WAITING_PAYMENT",
            "payment_deadline": "2026-10-18T14:00:00Z",
            "created_at": "2026-10-18T12:00:00Z",
            "items": []
        });
        Ok(serde_json::from_value(json).unwrap())
    }
}
