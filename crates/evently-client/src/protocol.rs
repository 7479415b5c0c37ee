//! # Wire Protocol
//!
//! Request and response bodies of the REST API that are not domain types.
//!
//! ## Response Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Success, enveloped     { "data": T }                                   │
//! │  Success, bare          T                                               │
//! │  Paginated list         { "data": [T], "total", "page", "totalPages" }  │
//! │  Error                  { "message", "errors"? | "fieldErrors"? }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The API is not consistent about the envelope, so single-resource
//! responses are decoded through [`Envelope`], which accepts both.

use std::collections::BTreeMap;

use evently_core::checkout::CheckoutState;
use evently_core::error::CoreResult;
use evently_core::types::{Coupon, Transaction, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RemoteError;

// =============================================================================
// Envelopes
// =============================================================================

/// A success body with or without a `data` wrapper.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } | Envelope::Bare(data) => data,
        }
    }
}

/// Decodes a single-resource success body.
pub fn decode_enveloped<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice::<Envelope<T>>(body).map(Envelope::into_inner)
}

/// One page of a transaction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default, alias = "totalPages")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

// =============================================================================
// Error Body
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
    #[serde(default, alias = "field_errors")]
    #[serde(rename = "fieldErrors")]
    field_errors: Option<Value>,
}

/// Builds a [`RemoteError`] from an error response.
///
/// The message is taken verbatim from `message` (or `error`). Bodies that are
/// not JSON fall back to the raw text, then to a generic status line.
pub fn parse_error_body(status: u16, body: &[u8]) -> RemoteError {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();

    let Some(parsed) = parsed else {
        let text = String::from_utf8_lossy(body).trim().to_string();
        return RemoteError {
            status,
            message: if text.is_empty() {
                fallback_message(status)
            } else {
                text
            },
            field_errors: BTreeMap::new(),
        };
    };

    let mut field_errors = BTreeMap::new();
    for value in [parsed.errors.as_ref(), parsed.field_errors.as_ref()]
        .into_iter()
        .flatten()
    {
        collect_field_errors(value, &mut field_errors);
    }

    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| field_errors.values().next().cloned())
        .unwrap_or_else(|| fallback_message(status));

    RemoteError {
        status,
        message,
        field_errors,
    }
}

fn fallback_message(status: u16) -> String {
    format!("Request failed with status {}", status)
}

/// Accepts `{field: "msg"}`, `{field: ["msg", ...]}` and
/// `[{field|path|param, message|msg}]`.
fn collect_field_errors(value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (field, v) in map {
                let message = match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Array(items) => items.iter().find_map(|i| i.as_str().map(String::from)),
                    _ => None,
                };
                if let Some(message) = message {
                    out.entry(field.clone()).or_insert(message);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let field = ["field", "path", "param"]
                    .iter()
                    .find_map(|k| item.get(*k).and_then(Value::as_str));
                let message = ["message", "msg"]
                    .iter()
                    .find_map(|k| item.get(*k).and_then(Value::as_str));
                if let (Some(field), Some(message)) = (field, message) {
                    out.entry(field.to_string())
                        .or_insert_with(|| message.to_string());
                }
            }
        }
        _ => {}
    }
}

// =============================================================================
// Create Transaction
// =============================================================================

/// One requested line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItemRequest {
    pub ticket_type_id: String,
    pub quantity: i64,
}

/// Body of `POST /transactions`.
///
/// Absent discounts are omitted rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub event_id: String,
    pub items: Vec<TransactionItemRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_to_use: Option<i64>,
}

impl CreateTransactionRequest {
    /// Packages a checkout. Fails locally on an empty or over-quota cart.
    pub fn from_checkout(state: &CheckoutState) -> CoreResult<Self> {
        let lines = state.validate_for_submit()?;
        let discount = state.discount();

        Ok(CreateTransactionRequest {
            event_id: state.event_id().to_string(),
            items: lines
                .into_iter()
                .map(|line| TransactionItemRequest {
                    ticket_type_id: line.ticket_type_id,
                    quantity: line.quantity,
                })
                .collect(),
            promotion_code: discount.promotion_code().map(String::from),
            coupon_code: discount.coupon_code().map(String::from),
            points_to_use: state.points_to_use().map(|points| points.rupiah()),
        })
    }
}

// =============================================================================
// Other Bodies
// =============================================================================

/// `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Responses that only carry a human message (register, password flows).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// `GET /users/me/coupons` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CouponsResponse {
    #[serde(default)]
    pub coupons: Vec<Coupon>,
}

/// `GET /users/me/coupons/validate/{code}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCheck {
    pub valid: bool,
    #[serde(default)]
    pub coupon: Option<Coupon>,
}

/// `GET /users/me/profile` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    #[serde(alias = "user")]
    pub profile: User,
}

/// Alias kept for list endpoints.
pub type TransactionPage = Page<Transaction>;
