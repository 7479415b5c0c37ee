//! # Validation Module
//!
//! Field-level rules shared by every form, plus the cart check run before
//! a transaction is submitted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (client side)                                    │
//! │  ├── Required / length / email shape / confirmation                    │
//! │  └── Cart non-empty, quantities within mirrored availability           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: REST API                                                     │
//! │  ├── Inventory, promotion quota, coupon ownership                      │
//! │  └── Authoritative; its message is shown verbatim                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use evently_core::validation::{validate_email, validate_password};
//!
//! assert!(validate_email("rina@example.com").is_ok());
//! assert!(validate_password("Password", "123").is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::pricing::SelectionLine;
use crate::types::TicketType;
use crate::{MIN_FULL_NAME_LEN, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only input. Returns the trimmed value.
pub fn validate_required<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value)
}

/// Required, and at least `min` characters once trimmed.
pub fn validate_min_len(field: &str, value: &str, min: usize) -> ValidationResult<()> {
    let value = validate_required(field, value)?;
    if value.chars().count() < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@`, non-empty local part
/// - Domain has a dot with text on both sides, no whitespace anywhere
///
/// ## Example
/// ```rust
/// use evently_core::validation::validate_email;
///
/// assert!(validate_email("budi@mail.co.id").is_ok());
/// assert!(validate_email("budi@localhost").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = validate_required("Email", email)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "Email".to_string(),
        reason: "invalid email address".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let (name, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if name.is_empty() || tld.is_empty() || name.starts_with('.') || name.ends_with('.') {
        return Err(invalid());
    }

    Ok(())
}

/// Password of at least [`MIN_PASSWORD_LEN`] characters.
pub fn validate_password(field: &str, password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required(field));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// The confirmation must be present and equal to the password.
pub fn validate_confirmation(password: &str, confirmation: &str) -> ValidationResult<()> {
    if confirmation.is_empty() {
        return Err(ValidationError::required("Confirm password"));
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Full name of at least [`MIN_FULL_NAME_LEN`] characters.
pub fn validate_full_name(name: &str) -> ValidationResult<()> {
    validate_min_len("Full name", name, MIN_FULL_NAME_LEN)
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a cart before submission.
///
/// ## User Workflow
/// ```text
/// Pay Now
///    │
///    ▼
/// validate_cart(lines, ticket_types) ← THIS FUNCTION
///    │
///    ├── no line with qty > 0 ──► EmptyCart (nothing is sent)
///    ├── unknown ticket type ───► TicketTypeNotFound
///    ├── qty > available ───────► QuantityExceedsAvailability
///    │
///    └── OK ──► POST /transactions
/// ```
pub fn validate_cart(lines: &[SelectionLine], ticket_types: &[TicketType]) -> CoreResult<()> {
    let mut any = false;

    for line in lines.iter().filter(|l| l.quantity > 0) {
        any = true;
        let ticket = ticket_types
            .iter()
            .find(|t| t.id == line.ticket_type_id)
            .ok_or_else(|| CoreError::TicketTypeNotFound(line.ticket_type_id.clone()))?;

        if line.quantity > ticket.available() {
            return Err(CoreError::QuantityExceedsAvailability {
                ticket_type: ticket.name.clone(),
                available: ticket.available(),
                requested: line.quantity,
            });
        }
    }

    if !any {
        return Err(CoreError::EmptyCart);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("rina@example.com").is_ok());
        assert!(validate_email("  rina.putri+events@mail.co.id ").is_ok());

        assert_eq!(validate_email(""), Err(ValidationError::required("Email")));
        assert!(validate_email("rina").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("rina@example").is_err());
        assert!(validate_email("rina@.com").is_err());
        assert!(validate_email("rina@example.").is_err());
        assert!(validate_email("ri na@example.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }

    #[test]
    fn test_validate_password_and_confirmation() {
        assert!(validate_password("Password", "secret").is_ok());
        assert_eq!(
            validate_password("Password", "12345"),
            Err(ValidationError::TooShort {
                field: "Password".into(),
                min: 6
            })
        );
        assert_eq!(
            validate_password("Password", ""),
            Err(ValidationError::required("Password"))
        );

        assert!(validate_confirmation("secret", "secret").is_ok());
        assert_eq!(
            validate_confirmation("secret", "secreT"),
            Err(ValidationError::PasswordMismatch)
        );
        assert!(validate_confirmation("secret", "").is_err());
    }

    #[test]
    fn test_validate_full_name() {
        assert!(validate_full_name("Ani").is_ok());
        assert!(validate_full_name(" Al ").is_err());
        assert!(validate_full_name("").is_err());
    }

    fn ticket(id: &str, available: i64) -> TicketType {
        TicketType {
            id: id.to_string(),
            name: id.to_uppercase(),
            price: Money::from_rupiah(50_000),
            quantity: None,
            available_quantity: available,
        }
    }

    fn line(id: &str, quantity: i64) -> SelectionLine {
        SelectionLine {
            ticket_type_id: id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_validate_cart() {
        let types = vec![ticket("a", 2)];

        assert_eq!(validate_cart(&[], &types), Err(CoreError::EmptyCart));
        assert_eq!(validate_cart(&[line("a", 0)], &types), Err(CoreError::EmptyCart));
        assert!(validate_cart(&[line("a", 2)], &types).is_ok());

        assert_eq!(
            validate_cart(&[line("a", 3)], &types),
            Err(CoreError::QuantityExceedsAvailability {
                ticket_type: "A".into(),
                available: 2,
                requested: 3
            })
        );
        assert_eq!(
            validate_cart(&[line("ghost", 1)], &types),
            Err(CoreError::TicketTypeNotFound("ghost".into()))
        );
    }
}
