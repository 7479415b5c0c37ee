//! # Output
//!
//! Text rendering for terminals, JSON for scripts.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use evently_client::Page;
use evently_core::checkout::CheckoutState;
use evently_core::countdown::PaymentCountdown;
use evently_core::discount::DiscountSource;
use evently_core::money::Money;
use evently_core::types::{Event, PointHistoryEntry, PointsSummary, Transaction, User};
use serde::Serialize;

use crate::error::CliResult;

const WIDTH: usize = 44;

/// Where command results go.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Prints `value` as JSON, or the text from `text`.
    pub fn emit<T, F>(&self, value: &T, text: F) -> CliResult<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    /// Prints a plain message, wrapped as `{"message": ...}` in JSON mode.
    pub fn message(&self, message: &str) -> CliResult<()> {
        self.emit(&serde_json::json!({ "message": message }), || message.to_string())
    }
}

fn row(out: &mut String, label: &str, amount: &str) {
    let pad = WIDTH.saturating_sub(label.chars().count() + amount.chars().count());
    let _ = writeln!(out, "{}{}{}", label, " ".repeat(pad.max(1)), amount);
}

fn minus(amount: Money) -> String {
    if amount.is_positive() {
        format!("-{}", amount)
    } else {
        amount.to_string()
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// The order summary shown before paying.
pub fn pricing_summary(state: &CheckoutState) -> String {
    let mut out = String::new();

    for line in state.lines() {
        let Some(ticket_type) = state.ticket_types().iter().find(|t| t.id == line.ticket_type_id)
        else {
            continue;
        };
        row(
            &mut out,
            &format!("{} x{}", ticket_type.name, line.quantity),
            &ticket_type.price.multiply_quantity(line.quantity).to_string(),
        );
    }

    let pricing = state.pricing();
    let _ = writeln!(out, "{}", "─".repeat(WIDTH));
    row(&mut out, "Subtotal", &pricing.subtotal.to_string());

    match state.discount() {
        DiscountSource::None => {}
        DiscountSource::Promotion(code) | DiscountSource::Coupon(code) => row(
            &mut out,
            &format!("Discount {} ({})", code.code, code.rule.describe()),
            &minus(pricing.discount_amount),
        ),
        DiscountSource::Points { balance } => row(
            &mut out,
            &format!("Points (balance {})", balance),
            &minus(pricing.points_applied),
        ),
    }

    row(&mut out, "Total", &pricing.final_total.to_string());
    out.trim_end().to_string()
}

// =============================================================================
// Events
// =============================================================================

fn event_price(event: &Event) -> String {
    if event.is_free {
        return "Free".to_string();
    }
    event
        .ticket_types
        .iter()
        .map(|t| t.price)
        .min()
        .or(event.base_price)
        .map(|p| format!("from {}", p))
        .unwrap_or_else(|| "-".to_string())
}

pub fn event_row(event: &Event) -> String {
    let place = event.city.as_deref().unwrap_or("-");
    format!(
        "{:<6} {:<28} {}  {:<14} {}",
        event.id,
        event.name,
        event.start_date.format("%Y-%m-%d"),
        place,
        event_price(event)
    )
}

pub fn event_list(events: &[Event]) -> String {
    if events.is_empty() {
        return "No events".to_string();
    }
    events.iter().map(event_row).collect::<Vec<_>>().join("\n")
}

/// Event header, ticket availability and the promotions running at `now`.
pub fn event_detail(event: &Event, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", event.name, event.id);
    let _ = writeln!(out, "When     {}", event.start_date.format("%Y-%m-%d %H:%M"));
    let place: Vec<&str> = [event.city.as_deref(), event.province.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !place.is_empty() {
        let _ = writeln!(out, "Where    {}", place.join(", "));
    }
    if let Some(category) = &event.category {
        let _ = writeln!(out, "Category {}", category);
    }

    if !event.ticket_types.is_empty() {
        let _ = writeln!(out);
        for ticket in &event.ticket_types {
            let availability = if ticket.is_sold_out() {
                "sold out".to_string()
            } else {
                format!("{} left", ticket.available())
            };
            row(
                &mut out,
                &format!("{} [{}] {}", ticket.name, ticket.id, availability),
                &ticket.price.to_string(),
            );
        }
    }

    let active: Vec<_> = event.promotions.iter().filter(|p| p.is_active_at(now)).collect();
    if !active.is_empty() {
        let _ = writeln!(out);
        for promotion in active {
            let _ = writeln!(out, "Promo    {} ({})", promotion.code, promotion.rule().describe());
        }
    }
    out.trim_end().to_string()
}

/// One value per line, or `empty` when there are none.
pub fn names(values: &[String], empty: &str) -> String {
    if values.is_empty() {
        empty.to_string()
    } else {
        values.join("\n")
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// One line per transaction for list output.
pub fn transaction_row(transaction: &Transaction) -> String {
    let event = transaction
        .event
        .as_ref()
        .map(|e| e.name.as_str())
        .unwrap_or("-");
    let count = transaction.ticket_count();
    format!(
        "{:<20} {:<22} {:>3} {:<7} {:>14}  {}",
        transaction.invoice_number,
        transaction.status.label(),
        count,
        if count == 1 { "ticket" } else { "tickets" },
        transaction.final_amount.to_string(),
        event
    )
}

pub fn transaction_page(page: &Page<Transaction>) -> String {
    if page.data.is_empty() {
        return "No transactions".to_string();
    }
    let mut out = String::new();
    for transaction in &page.data {
        let _ = writeln!(out, "{}", transaction_row(transaction));
    }
    let _ = write!(out, "Page {} of {} ({} total)", page.page, page.total_pages, page.total);
    out
}

/// Full transaction detail, with the countdown if payment is pending.
pub fn transaction_detail(transaction: &Transaction, countdown: Option<&PaymentCountdown>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Invoice  {}", transaction.invoice_number);
    let _ = writeln!(out, "Status   {}", transaction.status.label());
    if let Some(event) = &transaction.event {
        let _ = writeln!(out, "Event    {} ({})", event.name, event.start_date.format("%Y-%m-%d %H:%M"));
    }
    let _ = writeln!(out);

    for item in &transaction.items {
        let name = item
            .ticket_type
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| item.ticket_type_id.clone());
        row(&mut out, &format!("{} x{}", name, item.quantity), &item.subtotal.to_string());
    }
    let _ = writeln!(out, "{}", "─".repeat(WIDTH));
    row(&mut out, "Subtotal", &transaction.total_amount.to_string());
    if transaction.discount_amount.is_positive() {
        row(&mut out, "Discount", &minus(transaction.discount_amount));
    }
    if transaction.points_used.is_positive() {
        row(&mut out, "Points", &minus(transaction.points_used));
    }
    row(&mut out, "Total", &transaction.final_amount.to_string());

    if let Some(reason) = &transaction.rejection_reason {
        let _ = writeln!(out, "\nRejected: {}", reason);
    }
    if let Some(countdown) = countdown {
        let _ = writeln!(out, "\nPay within {}", countdown.display());
    }
    out.trim_end().to_string()
}

// =============================================================================
// Account
// =============================================================================

pub fn user(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} <{}>", user.full_name, user.email);
    let _ = writeln!(out, "Role     {}", user.role.as_str());
    if let Some(phone) = &user.phone_number {
        let _ = writeln!(out, "Phone    {}", phone);
    }
    if let Some(code) = &user.referral_code {
        let _ = writeln!(out, "Referral {}", code);
    }
    out.trim_end().to_string()
}

pub fn points(summary: &PointsSummary, now: DateTime<Utc>) -> String {
    let mut out = format!("Balance  {}", summary.balance_at(now));
    if let Some(entry) = summary.next_expiry(now) {
        let _ = write!(
            out,
            "\nNext expiry {} on {}",
            entry.remaining_amount,
            entry.expires_at.format("%Y-%m-%d")
        );
    }
    out
}

/// Every point grant, newest first, with expired ones marked.
pub fn point_history(entries: &[PointHistoryEntry], now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return "No points history yet".to_string();
    }
    let mut sorted: Vec<&PointHistoryEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| std::cmp::Reverse(e.created_at.unwrap_or(e.entry.expires_at)));

    let mut out = String::new();
    for item in sorted {
        let granted = item
            .created_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{}  {:>14} remaining {:>14}  expires {}{}",
            granted,
            item.entry.amount.to_string(),
            item.entry.remaining_amount.to_string(),
            item.entry.expires_at.format("%Y-%m-%d"),
            if item.is_expired_at(now) { "  EXPIRED" } else { "" }
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> CheckoutState {
        let event: evently_core::types::Event = serde_json::from_str(
            r#"{"id": 7, "name": "Jazz Night", "start_date": "2026-11-01T19:00:00Z",
                "ticket_types": [{"id": 11, "name": "Regular", "price": 50000, "available_quantity": 40}],
                "promotions": [{"id": 3, "code": "EARLY10", "discount_percentage": 10}]}"#,
        )
        .unwrap();
        CheckoutState::new(&event, vec![], Money::from_rupiah(30_000))
    }

    #[test]
    fn test_summary_with_promotion() {
        let mut state = state();
        state.set_quantity("11", 2);
        let promo = state.promotion_by_code("EARLY10").cloned();
        state.select_promotion(promo.as_ref());

        let text = pricing_summary(&state);
        assert!(text.contains("Regular x2"));
        assert!(text.contains("Discount EARLY10 (10% off)"));
        assert!(text.contains("-Rp 10.000"));
        assert!(text.lines().last().unwrap().ends_with("Rp 90.000"));
    }

    #[test]
    fn test_summary_with_points() {
        let mut state = state();
        state.set_quantity("11", 1);
        state.select_points(true);

        let text = pricing_summary(&state);
        assert!(text.contains("Points (balance Rp 30.000)"));
        assert!(text.lines().last().unwrap().ends_with("Rp 20.000"));
    }

    #[test]
    fn test_empty_page() {
        let page: Page<Transaction> =
            serde_json::from_str(r#"{"data": [], "total": 0, "page": 1, "totalPages": 0}"#).unwrap();
        assert_eq!(transaction_page(&page), "No transactions");
    }

    fn event() -> Event {
        serde_json::from_str(
            r#"{"id": 7, "name": "Jazz Night", "start_date": "2026-11-01T19:00:00Z",
                "city": "Jakarta", "province": "DKI Jakarta", "category": "Music",
                "ticket_types": [
                    {"id": 11, "name": "Regular", "price": 50000, "available_quantity": 40},
                    {"id": 12, "name": "VIP", "price": 250000, "available_quantity": 0}],
                "promotions": [
                    {"id": 3, "code": "EARLY10", "discount_percentage": 10},
                    {"id": 4, "code": "OLD", "discount_amount": 5000,
                     "valid_until": "2026-01-01T00:00:00Z"}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_event_detail_marks_sold_out_and_active_promotions() {
        let now = "2026-10-18T00:00:00Z".parse().unwrap();
        let text = event_detail(&event(), now);
        assert!(text.contains("Where    Jakarta, DKI Jakarta"));
        assert!(text.contains("Regular [11] 40 left"));
        assert!(text.contains("VIP [12] sold out"));
        assert!(text.contains("Promo    EARLY10 (10% off)"));
        assert!(!text.contains("OLD"));
    }

    #[test]
    fn test_event_list() {
        assert_eq!(event_list(&[]), "No events");
        let text = event_list(&[event()]);
        assert!(text.contains("Jazz Night"));
        assert!(text.ends_with("from Rp 50.000"));
    }

    #[test]
    fn test_transaction_row_counts_tickets() {
        let transaction: Transaction = serde_json::from_str(
            r#"{"id": "t-1", "event_id": 7, "invoice_number": "INV-001", "status": "WAITING_PAYMENT",
                "total_amount": 150000, "final_amount": 150000, "created_at": "2026-10-18T00:00:00Z",
                "items": [
                    {"ticket_type_id": 11, "quantity": 2, "price_at_buy": 50000, "subtotal": 100000},
                    {"ticket_type_id": 12, "quantity": 1, "price_at_buy": 50000, "subtotal": 50000}]}"#,
        )
        .unwrap();
        let row = transaction_row(&transaction);
        assert!(row.contains("  3 tickets"));
        assert!(row.contains("Rp 150.000"));
    }

    #[test]
    fn test_point_history_marks_expired() {
        let entries: Vec<PointHistoryEntry> = serde_json::from_str(
            r#"[{"id": 1, "amount": 10000, "remaining_amount": 0,
                 "expires_at": "2026-03-01T00:00:00Z", "created_at": "2025-12-01T00:00:00Z"},
                {"id": 2, "amount": 10000, "remaining_amount": 10000,
                 "expires_at": "2027-03-01T00:00:00Z", "created_at": "2026-09-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let now = "2026-10-18T00:00:00Z".parse().unwrap();
        let text = point_history(&entries, now);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("2026-09-01"));
        assert!(!lines[0].ends_with("EXPIRED"));
        assert!(lines[1].ends_with("EXPIRED"));
        assert_eq!(point_history(&[], now), "No points history yet");
    }
}
