//! # Payment Countdown
//!
//! Seconds left to pay for a `WAITING_PAYMENT` transaction.
//!
//! ```text
//!   start(deadline, now)          tick() once per second
//!   remaining = ⌊deadline − now⌋ ──► Running(n-1) ... Running(1) ──► Expired ──► Stopped ...
//!                                                                       │
//!                                                     caller refreshes the transaction
//! ```
//!
//! The clock is injected: the caller owns the timer and passes `now`.

use chrono::{DateTime, Utc};

use crate::types::{Transaction, TransactionStatus};

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; seconds left.
    Running(u64),
    /// Reached zero on this tick. Reported once.
    Expired,
    /// Already expired earlier.
    Stopped,
}

/// Countdown to a payment deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCountdown {
    remaining: u64,
    expired_reported: bool,
}

impl PaymentCountdown {
    /// Starts a countdown at `max(0, ⌊(deadline − now) / 1s⌋)`.
    pub fn start(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = (deadline - now).num_seconds().max(0) as u64;
        PaymentCountdown {
            remaining,
            expired_reported: false,
        }
    }

    /// Countdown for a transaction, only while it awaits payment and has a
    /// deadline.
    pub fn for_transaction(transaction: &Transaction, now: DateTime<Utc>) -> Option<Self> {
        if transaction.status != TransactionStatus::WaitingPayment {
            return None;
        }
        transaction
            .payment_deadline
            .map(|deadline| PaymentCountdown::start(deadline, now))
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Advances by one second.
    pub fn tick(&mut self) -> Tick {
        if self.remaining > 0 {
            self.remaining -= 1;
        }
        if self.remaining > 0 {
            return Tick::Running(self.remaining);
        }
        if self.expired_reported {
            Tick::Stopped
        } else {
            self.expired_reported = true;
            Tick::Expired
        }
    }

    /// Remaining time as `HH:MM:SS`.
    pub fn display(&self) -> String {
        format_hms(self.remaining)
    }
}

/// Formats seconds as zero-padded `HH:MM:SS`. Hours are not wrapped at 24.
///
/// ```rust
/// use evently_core::countdown::format_hms;
/// assert_eq!(format_hms(3_725), "01:02:05");
/// ```
pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
