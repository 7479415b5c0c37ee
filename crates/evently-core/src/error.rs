//! # Error Types
//!
//! Domain-specific error types for evently-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  evently-core errors (this file)                                       │
//! │  ├── CoreError        - Checkout rule violations                       │
//! │  └── ValidationError  - Form / input validation failures               │
//! │                                                                         │
//! │  evently-client errors (separate crate)                                │
//! │  └── ClientError      - Remote, transport, config failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → CLI exit code       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are fatal: every one is recoverable by the user editing
//! the input and trying again. Nothing here ever reaches the network.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Checkout rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Submission attempted with no ticket selected.
    ///
    /// ## User Workflow
    /// ```text
    /// Pay Now (cart empty)
    ///      │
    ///      ▼
    /// EmptyCart  ──► no request is sent, control stays disabled
    /// ```
    #[error("Please select at least one ticket")]
    EmptyCart,

    /// A quantity above what the server reported as available.
    #[error("Only {available} tickets left for {ticket_type}, requested {requested}")]
    QuantityExceedsAvailability {
        ticket_type: String,
        available: i64,
        requested: i64,
    },

    /// A selection line references a ticket type that is not on the event.
    #[error("Ticket type not found: {0}")]
    TicketTypeNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Messages are the ones shown inline next to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Confirmation field differs from the original.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// A date range whose start is after its end.
    #[error("{from_field} must not be after {to_field}")]
    InvalidRange { from_field: String, to_field: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
