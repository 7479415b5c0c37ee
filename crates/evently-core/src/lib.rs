//! # evently-core: Pure Checkout Logic for Evently
//!
//! Everything the checkout view computes, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Evently Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    evently-cli (apps/)                          │   │
//! │  │    quote ──► checkout ──► transactions ──► organizer review     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    evently-client                               │   │
//! │  │    HttpApi, loader, submitter, config, session store            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ evently-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ checkout │ │ pricing  │ │ discount │ │  money   │          │   │
//! │  │   │ reducer  │ │ summary  │ │  rules   │ │ Rupiah   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │  forms   │ │ session  │ │countdown │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO NETWORK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types mirrored from the REST API
//! - [`money`] - Rupiah amounts and percentages as integers
//! - [`discount`] - Promotion / coupon / points, only one at a time
//! - [`pricing`] - Subtotal, discount, points, final total
//! - [`checkout`] - Checkout state and its reducer
//! - [`countdown`] - Payment deadline countdown
//! - [`session`] - Auth session context
//! - [`forms`] / [`validation`] - Form bodies and their rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use evently_core::discount::{DiscountRule, DiscountSource, AppliedCode};
//! use evently_core::money::{Money, Percentage};
//! use evently_core::pricing::price_subtotal;
//!
//! let promo = DiscountSource::Promotion(AppliedCode {
//!     id: "3".into(),
//!     code: "EARLY10".into(),
//!     rule: DiscountRule::percent(Percentage::from_percent(10.0)),
//! });
//!
//! let summary = price_subtotal(Money::from_rupiah(100_000), &promo);
//! assert_eq!(summary.final_total.rupiah(), 90_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod countdown;
pub mod discount;
pub mod error;
pub mod forms;
pub mod money;
pub mod pricing;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{apply_event, CheckoutEvent, CheckoutState, SubmissionStatus};
pub use discount::{DiscountRule, DiscountSource};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percentage};
pub use pricing::{PricingResult, SelectionLine};
pub use session::{AuthSession, Credentials, SessionState};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum password length for register, change and reset.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum full name length for register and profile.
pub const MIN_FULL_NAME_LEN: usize = 3;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest page size the transaction list accepts.
pub const MAX_PAGE_LIMIT: u32 = 100;
