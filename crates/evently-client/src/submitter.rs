//! # Transaction Submitter
//!
//! Turns a checkout into exactly one `POST /transactions`.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit(state)                                                          │
//! │      │                                                                  │
//! │      ├── already in flight? ───────────► SubmissionInFlight (local)    │
//! │      │                                                                  │
//! │      ├── package request                                               │
//! │      │     empty cart / over quota ────► Validation (local, no I/O)    │
//! │      │                                                                  │
//! │      ├── POST /transactions (single attempt)                           │
//! │      │     4xx/5xx ────────────────────► Remote (message verbatim)     │
//! │      │                                                                  │
//! │      └── ok ──► TransactionRef { id, invoice_number }                  │
//! │                                                                         │
//! │  The in-flight flag is released on every exit path.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use evently_core::checkout::{CheckoutEvent, CheckoutState};
use evently_core::types::TransactionRef;
use tracing::{debug, error, info};

use crate::api::CheckoutApi;
use crate::error::{ClientError, ClientResult};
use crate::protocol::CreateTransactionRequest;

/// Submits checkouts, one at a time.
#[derive(Debug)]
pub struct TransactionSubmitter<A> {
    api: A,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: CheckoutApi> TransactionSubmitter<A> {
    pub fn new(api: A) -> Self {
        TransactionSubmitter {
            api,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submits the checkout as it currently stands.
    ///
    /// The checkout itself is not touched; see [`Self::submit_checkout`] for
    /// the variant that drives its submission status.
    pub async fn submit(&self, state: &CheckoutState) -> ClientResult<TransactionRef> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(event_id = state.event_id(), "Submission already in flight");
            return Err(ClientError::SubmissionInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let request = CreateTransactionRequest::from_checkout(state)?;
        let pricing = state.pricing();
        debug!(
            event_id = %request.event_id,
            items = request.items.len(),
            subtotal = pricing.subtotal.rupiah(),
            final_total = pricing.final_total.rupiah(),
            "Submitting transaction"
        );

        match self.api.create_transaction(&request).await {
            Ok(transaction) => {
                info!(
                    transaction_id = %transaction.id,
                    invoice = %transaction.invoice_number,
                    final_amount = transaction.final_amount.rupiah(),
                    "Transaction created"
                );
                Ok(transaction.reference())
            }
            Err(e) => {
                error!(event_id = %request.event_id, error = %e, "Transaction submission failed");
                Err(e)
            }
        }
    }

    /// Submits and records the outcome on the checkout.
    ///
    /// On success the cart is discarded; on failure the cart and discount
    /// stay and the error message is kept for display.
    pub async fn submit_checkout(&self, state: &mut CheckoutState) -> ClientResult<TransactionRef> {
        state.apply(CheckoutEvent::SubmitStarted);

        let result = self.submit(state).await;
        match &result {
            Ok(reference) => state.apply(CheckoutEvent::SubmitSucceeded(reference.clone())),
            Err(e) => state.apply(CheckoutEvent::SubmitFailed {
                message: e.to_string(),
            }),
        }
        result
    }
}
