//! # Domain Types
//!
//! Types mirrored from the ticketing REST API.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Event       │   │   Transaction   │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  ticket_types[] │   │  invoice_number │   │  email          │       │
//! │  │  promotions[]   │   │  status         │   │  role           │       │
//! │  │  start_date     │   │  final_amount   │   │  referral_code  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   TicketType    │   │     Coupon      │   │  PointsSummary  │       │
//! │  │  price          │   │  (per user)     │   │  total_balance  │       │
//! │  │  available_qty  │   │  is_valid       │   │  entries[]      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifiers
//! The API is not consistent about ids: events and ticket types come back
//! as numbers, transactions and coupons as UUID strings. Every id is held
//! as a `String`; numeric ids are stringified on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::discount::DiscountRule;
use crate::money::{Money, Percentage};

// =============================================================================
// Id Deserialization
// =============================================================================

pub(crate) mod id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    impl From<RawId> for String {
        fn from(raw: RawId) -> Self {
            match raw {
                RawId::Text(s) => s,
                RawId::Int(n) => n.to_string(),
                RawId::Float(f) => format!("{}", f as i64),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawId::deserialize(deserializer).map(String::from)
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
    }
}

// =============================================================================
// User
// =============================================================================

/// Account role. Organizers manage events, promotions and confirm payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    Customer,
    Organizer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Organizer => "ORGANIZER",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CUSTOMER" => Ok(Role::Customer),
            "ORGANIZER" => Ok(Role::Organizer),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

impl User {
    #[inline]
    pub fn is_organizer(&self) -> bool {
        self.role == Role::Organizer
    }
}

// =============================================================================
// Ticket Type
// =============================================================================

/// A purchasable category within an event ("Regular", "VIP").
///
/// `available_quantity` mirrors the server's inventory and is only used to
/// clamp the quantity selector; the server re-checks it on submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TicketType {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Total capacity configured by the organizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    /// Tickets still for sale.
    #[serde(default)]
    pub available_quantity: i64,
}

impl TicketType {
    /// Available quantity, never negative.
    #[inline]
    pub fn available(&self) -> i64 {
        self.available_quantity.max(0)
    }

    #[inline]
    pub fn is_sold_out(&self) -> bool {
        self.available() == 0
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// An event-level discount code defined by the organizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Promotion {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub code: String,
    #[serde(default)]
    #[ts(as = "Option<f64>")]
    pub discount_percentage: Option<Percentage>,
    #[serde(default)]
    pub discount_amount: Option<Money>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default, alias = "max_usage")]
    pub usage_limit: Option<i64>,
}

impl Promotion {
    /// The discount this promotion grants.
    pub fn rule(&self) -> DiscountRule {
        DiscountRule::new(self.discount_percentage, self.discount_amount)
    }

    /// Whether the promotion is inside its validity window at `now`.
    /// Missing bounds are treated as open.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_from.map_or(true, |from| from <= now)
            && self.valid_until.map_or(true, |until| now <= until)
    }
}

// =============================================================================
// Coupon
// =============================================================================

fn default_true() -> bool {
    true
}

/// A user-specific discount code, typically a referral reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub code: String,
    #[serde(default)]
    #[ts(as = "Option<f64>")]
    pub discount_percentage: Option<Percentage>,
    #[serde(default)]
    pub discount_amount: Option<Money>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_used: bool,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default = "default_true")]
    pub is_valid: bool,
}

impl Coupon {
    /// The discount this coupon grants.
    pub fn rule(&self) -> DiscountRule {
        DiscountRule::new(self.discount_percentage, self.discount_amount)
    }

    /// Whether the coupon can be redeemed. The server flag is authoritative;
    /// a used or expired coupon is never redeemable.
    pub fn is_redeemable(&self) -> bool {
        self.is_valid && !self.is_used && !self.is_expired
    }
}

// =============================================================================
// Points
// =============================================================================

/// One grant of loyalty points (referral reward) with its own expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEntry {
    #[serde(default, deserialize_with = "id::deserialize_opt")]
    pub id: Option<String>,
    pub amount: Money,
    pub remaining_amount: Money,
    pub expires_at: DateTime<Utc>,
}

/// A past point grant as shown in the rewards history, expired ones included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointHistoryEntry {
    #[serde(flatten)]
    pub entry: PointEntry,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_expired: bool,
}

impl PointHistoryEntry {
    /// Expired per the server flag or because the expiry has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.is_expired || self.entry.expires_at <= now
    }
}

/// The user's loyalty balance. One point redeems for one Rupiah.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointsSummary {
    #[serde(alias = "total_points", alias = "totalBalance")]
    pub total_balance: Money,
    #[serde(default, alias = "points")]
    pub entries: Vec<PointEntry>,
}

impl PointsSummary {
    /// Balance still spendable at `now`.
    ///
    /// The server's `total_balance` is authoritative, but it can lag behind
    /// entries that expired since it was computed, so it is capped by the
    /// remaining amounts of unexpired entries. Without a breakdown the total
    /// is used as is.
    pub fn balance_at(&self, now: DateTime<Utc>) -> Money {
        let total = self.total_balance.non_negative();
        if self.entries.is_empty() {
            return total;
        }
        let unexpired: Money = self
            .entries
            .iter()
            .filter(|e| e.expires_at > now)
            .map(|e| e.remaining_amount.non_negative())
            .sum();
        total.min(unexpired)
    }

    /// The entry that expires first among those still holding points.
    pub fn next_expiry(&self, now: DateTime<Utc>) -> Option<&PointEntry> {
        self.entries
            .iter()
            .filter(|e| e.expires_at > now && e.remaining_amount.is_positive())
            .min_by_key(|e| e.expires_at)
    }
}

// =============================================================================
// Event
// =============================================================================

/// An event with its ticket types and organizer promotions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Event {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_price: Option<Money>,
    #[serde(default)]
    pub available_seats: Option<i64>,
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "id::deserialize_opt")]
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub ticket_types: Vec<TicketType>,
    #[serde(default)]
    pub promotions: Vec<Promotion>,
}

impl Event {
    /// Looks up a ticket type by id.
    pub fn ticket_type(&self, id: &str) -> Option<&TicketType> {
        self.ticket_types.iter().find(|t| t.id == id)
    }

    /// Looks up a promotion by code (case-insensitive, as typed by users).
    pub fn promotion_by_code(&self, code: &str) -> Option<&Promotion> {
        let code = code.trim();
        self.promotions
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// Lifecycle of a ticket purchase.
///
/// ```text
/// WAITING_PAYMENT ──upload proof──► WAITING_CONFIRMATION ──accept──► DONE
///      │    │                                   │
///      │    └──deadline──► EXPIRED              └──reject──► REJECTED
///      └──cancel──► CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TransactionStatus {
    WaitingPayment,
    WaitingConfirmation,
    Done,
    Rejected,
    Expired,
    Cancelled,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 6] = [
        TransactionStatus::WaitingPayment,
        TransactionStatus::WaitingConfirmation,
        TransactionStatus::Done,
        TransactionStatus::Rejected,
        TransactionStatus::Expired,
        TransactionStatus::Cancelled,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::WaitingPayment => "WAITING_PAYMENT",
            TransactionStatus::WaitingConfirmation => "WAITING_CONFIRMATION",
            TransactionStatus::Done => "DONE",
            TransactionStatus::Rejected => "REJECTED",
            TransactionStatus::Expired => "EXPIRED",
            TransactionStatus::Cancelled => "CANCELLED",
        }
    }

    /// Human label, e.g. `WAITING PAYMENT`.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// No further transitions happen from a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Done
                | TransactionStatus::Rejected
                | TransactionStatus::Expired
                | TransactionStatus::Cancelled
        )
    }

    /// The customer can still cancel or upload a payment proof.
    pub fn awaits_payment(&self) -> bool {
        matches!(self, TransactionStatus::WaitingPayment)
    }

    /// The organizer can accept or reject.
    pub fn awaits_review(&self) -> bool {
        matches!(self, TransactionStatus::WaitingConfirmation)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        TransactionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Unknown transaction status: {}", s))
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Ticket type snapshot embedded in a transaction item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TicketTypeSnapshot {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A line of a transaction. Prices are frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionItem {
    #[serde(default, deserialize_with = "id::deserialize_opt")]
    pub id: Option<String>,
    #[serde(deserialize_with = "id::deserialize")]
    pub ticket_type_id: String,
    pub quantity: i64,
    pub price_at_buy: Money,
    pub subtotal: Money,
    #[serde(default)]
    pub ticket_type: Option<TicketTypeSnapshot>,
}

/// Event snapshot embedded in a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionEvent {
    pub name: String,
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
}

/// A ticket purchase as recorded by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(default, deserialize_with = "id::deserialize_opt")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "id::deserialize")]
    pub event_id: String,
    pub invoice_number: String,
    pub total_amount: Money,
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default)]
    pub points_used: Money,
    pub final_amount: Money,
    #[serde(default, deserialize_with = "id::deserialize_opt")]
    pub promotion_id: Option<String>,
    #[serde(default, deserialize_with = "id::deserialize_opt")]
    pub coupon_id: Option<String>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub payment_proof: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub payment_deadline: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<TransactionItem>,
    #[serde(default)]
    pub event: Option<TransactionEvent>,
}

impl Transaction {
    /// The handle used to navigate to the transaction after checkout.
    pub fn reference(&self) -> TransactionRef {
        TransactionRef {
            id: self.id.clone(),
            invoice_number: self.invoice_number.clone(),
        }
    }

    /// Total number of tickets across all items.
    pub fn ticket_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Reference to a created transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionRef {
    pub id: String,
    pub invoice_number: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_accepts_numeric_ids() {
        let json = r#"{
            "id": 7,
            "name": "Jazz Night",
            "start_date": "2026-11-01T19:00:00Z",
            "city": "Jakarta",
            "ticket_types": [
                {"id": 11, "name": "Regular", "price": 50000, "available_quantity": 40}
            ],
            "promotions": [
                {"id": 3, "code": "EARLY10", "discount_percentage": 10, "discount_amount": null}
            ]
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "7");
        assert_eq!(event.ticket_types[0].id, "11");
        assert_eq!(event.ticket_type("11").unwrap().price.rupiah(), 50_000);
        assert_eq!(
            event.promotion_by_code("early10").unwrap().discount_percentage,
            Some(Percentage::from_bps(1000))
        );
        assert!(event.promotions[0].discount_amount.is_none());
    }

    #[test]
    fn test_transaction_status_parsing() {
        assert_eq!(
            "waiting payment".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::WaitingPayment
        );
        assert_eq!(
            "DONE".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Done
        );
        assert!("paid".parse::<TransactionStatus>().is_err());
        assert_eq!(TransactionStatus::WaitingConfirmation.label(), "WAITING CONFIRMATION");
    }

    #[test]
    fn test_transaction_status_serde() {
        let json = serde_json::to_string(&TransactionStatus::WaitingConfirmation).unwrap();
        assert_eq!(json, "\"WAITING_CONFIRMATION\"");
        assert!(TransactionStatus::Expired.is_terminal());
        assert!(!TransactionStatus::WaitingPayment.is_terminal());
    }

    #[test]
    fn test_coupon_redeemable() {
        let json = r#"{"id": "c-1", "code": "REF-ABC", "discount_percentage": null,
                       "discount_amount": 25000, "is_used": false, "is_expired": false, "is_valid": true}"#;
        let mut coupon: Coupon = serde_json::from_str(json).unwrap();
        assert!(coupon.is_redeemable());

        coupon.is_used = true;
        assert!(!coupon.is_redeemable());
    }

    #[test]
    fn test_points_summary_aliases_and_balance() {
        let json = r#"{"total_points": 30000, "points": [
            {"id": 1, "amount": 10000, "remaining_amount": 10000, "expires_at": "2026-01-01T00:00:00Z"},
            {"id": 2, "amount": 20000, "remaining_amount": 20000, "expires_at": "2027-01-01T00:00:00Z"}
        ]}"#;
        let summary: PointsSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.total_balance.rupiah(), 30_000);

        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(summary.balance_at(now).rupiah(), 20_000);
        assert_eq!(summary.next_expiry(now).unwrap().id.as_deref(), Some("2"));
    }

    #[test]
    fn test_points_balance_prefers_server_total() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let entry = |remaining: i64, expires: DateTime<Utc>| PointEntry {
            id: None,
            amount: Money::from_rupiah(20_000),
            remaining_amount: Money::from_rupiah(remaining),
            expires_at: expires,
        };
        let later = now + chrono::Duration::days(30);

        // Server already deducted a redemption the entries do not show yet
        let summary = PointsSummary {
            total_balance: Money::from_rupiah(15_000),
            entries: vec![entry(20_000, later)],
        };
        assert_eq!(summary.balance_at(now).rupiah(), 15_000);

        // Everything expired
        let summary = PointsSummary {
            total_balance: Money::from_rupiah(20_000),
            entries: vec![entry(20_000, now)],
        };
        assert_eq!(summary.balance_at(now), Money::zero());
        assert!(summary.next_expiry(now).is_none());

        let summary = PointsSummary {
            total_balance: Money::from_rupiah(40_000),
            entries: Vec::new(),
        };
        assert_eq!(summary.balance_at(now).rupiah(), 40_000);
    }

    #[test]
    fn test_point_history_entry() {
        let json = r#"{"id": 9, "amount": 10000, "remaining_amount": 0,
                       "expires_at": "2026-03-01T00:00:00Z", "created_at": "2025-12-01T00:00:00Z"}"#;
        let entry: PointHistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.entry.id.as_deref(), Some("9"));
        assert!(!entry.is_expired);

        let before = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        assert!(!entry.is_expired_at(before));
        assert!(entry.is_expired_at(after));
    }

    #[test]
    fn test_promotion_validity_window() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let promo = Promotion {
            id: "1".into(),
            code: "EARLY".into(),
            discount_percentage: None,
            discount_amount: Some(Money::from_rupiah(10_000)),
            valid_from: Some(now - chrono::Duration::days(1)),
            valid_until: Some(now - chrono::Duration::hours(1)),
            usage_limit: None,
        };
        assert!(!promo.is_active_at(now));
        assert!(promo.is_active_at(now - chrono::Duration::hours(2)));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("organizer".parse::<Role>().unwrap(), Role::Organizer);
        assert!("admin".parse::<Role>().is_err());
    }
}
