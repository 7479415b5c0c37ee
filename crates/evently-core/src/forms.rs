//! # Forms
//!
//! Request bodies and query filters that users type in, each with its own
//! `validate()`.
//! They serialize to exactly what the REST API expects; confirmation fields
//! are checked locally and never sent.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::{Money, Percentage};
use crate::types::{Role, TransactionStatus};
use crate::validation::{
    validate_confirmation, validate_email, validate_full_name, validate_password,
    validate_required, ValidationResult,
};
use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

// =============================================================================
// Auth Forms
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::required("Password"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing, default)]
    pub confirm_password: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_full_name(&self.full_name)?;
        validate_email(&self.email)?;
        validate_password("Password", &self.password)?;
        validate_confirmation(&self.password, &self.confirm_password)?;
        Ok(())
    }
}

/// Profile edit. Only the name and phone are editable from the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ProfileForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_full_name(&self.full_name)
    }
}

// =============================================================================
// Password Forms
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    #[serde(skip_serializing, default)]
    pub confirm_password: String,
}

impl ChangePasswordForm {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.old_password.is_empty() {
            return Err(ValidationError::required("Current password"));
        }
        validate_password("New password", &self.new_password)?;
        validate_confirmation(&self.new_password, &self.confirm_password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_email(&self.email)
    }
}

/// Reset with the token from the emailed link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordForm {
    pub token: String,
    pub new_password: String,
    #[serde(skip_serializing, default)]
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("Reset token", &self.token)?;
        validate_password("New password", &self.new_password)?;
        validate_confirmation(&self.new_password, &self.confirm_password)
    }
}

// =============================================================================
// Transaction Listing
// =============================================================================

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

/// Filters for the customer and organizer transaction lists.
///
/// Serialized as query parameters; absent filters are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    /// Organizer list only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        TransactionQuery {
            page: default_page(),
            limit: default_limit(),
            status: None,
            date_from: None,
            date_to: None,
            event_id: None,
        }
    }
}

impl TransactionQuery {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.page < 1 {
            return Err(ValidationError::OutOfRange {
                field: "page".to_string(),
                min: 1,
                max: i64::from(u32::MAX),
            });
        }
        if self.limit < 1 || self.limit > MAX_PAGE_LIMIT {
            return Err(ValidationError::OutOfRange {
                field: "limit".to_string(),
                min: 1,
                max: i64::from(MAX_PAGE_LIMIT),
            });
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(ValidationError::InvalidRange {
                    from_field: "date_from".to_string(),
                    to_field: "date_to".to_string(),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Organizer Decision
// =============================================================================

/// Organizer verdict on an uploaded payment proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl StatusUpdate {
    pub fn accept() -> Self {
        StatusUpdate {
            status: TransactionStatus::Done,
            rejection_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        StatusUpdate {
            status: TransactionStatus::Rejected,
            rejection_reason: Some(reason.into()),
        }
    }

    /// Only `DONE` and `REJECTED` are decisions; a rejection needs a reason.
    pub fn validate(&self) -> ValidationResult<()> {
        match self.status {
            TransactionStatus::Done => Ok(()),
            TransactionStatus::Rejected => {
                validate_required(
                    "Rejection reason",
                    self.rejection_reason.as_deref().unwrap_or_default(),
                )?;
                Ok(())
            }
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec![
                    TransactionStatus::Done.as_str().to_string(),
                    TransactionStatus::Rejected.as_str().to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Event Browsing
// =============================================================================

/// Filters for the public event list. Absent filters are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Only sent when set; `false` means "no filter", not "paid only".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Money>,
}

impl EventQuery {
    pub fn validate(&self) -> ValidationResult<()> {
        for (field, price) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if price.is_some_and(|p| p.is_negative()) {
                return Err(non_negative(field));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(ValidationError::InvalidRange {
                    from_field: "min_price".to_string(),
                    to_field: "max_price".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn non_negative(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

fn at_least_one(field: &str, value: i64) -> ValidationResult<()> {
    if value < 1 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: i64::MAX,
        });
    }
    Ok(())
}

fn ordered_dates(
    from_field: &str,
    from: DateTime<Utc>,
    to_field: &str,
    to: DateTime<Utc>,
) -> ValidationResult<()> {
    if from > to {
        return Err(ValidationError::InvalidRange {
            from_field: from_field.to_string(),
            to_field: to_field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Organizer Events
// =============================================================================

/// One ticket tier of a new event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketTypeDraft {
    pub name: String,
    pub price: Money,
    pub quantity: i64,
}

/// `POST /events` body. The image is a URL; nothing is uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub city: String,
    pub province: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub base_price: Money,
    pub total_seats: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub ticket_types: Vec<TicketTypeDraft>,
}

impl CreateEventForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("Event name", &self.name)?;
        validate_required("Description", &self.description)?;
        validate_required("Category", &self.category)?;
        validate_required("City", &self.city)?;
        validate_required("Province", &self.province)?;
        ordered_dates("start_date", self.start_date, "end_date", self.end_date)?;
        if self.base_price.is_negative() {
            return Err(non_negative("base_price"));
        }
        at_least_one("total_seats", self.total_seats)?;

        if let Some(image) = self.image.as_deref().filter(|i| !i.trim().is_empty()) {
            if !(image.starts_with("http://") || image.starts_with("https://")) {
                return Err(ValidationError::InvalidFormat {
                    field: "image".to_string(),
                    reason: "must be an http(s) URL".to_string(),
                });
            }
        }

        for ticket in &self.ticket_types {
            validate_required("Ticket name", &ticket.name)?;
            if ticket.price.is_negative() {
                return Err(non_negative("price"));
            }
            at_least_one("quantity", ticket.quantity)?;
        }
        Ok(())
    }
}

// =============================================================================
// Promotions
// =============================================================================

/// The discount a promotion grants. Exactly one kind is sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PromotionDiscount {
    #[serde(rename = "discount_percentage")]
    Percentage(Percentage),
    #[serde(rename = "discount_amount")]
    Amount(Money),
}

/// `POST /events/{id}/promotions` body.
///
/// A blank code lets the server generate one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePromotionForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(flatten)]
    pub discount: PromotionDiscount,
    pub max_usage: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl CreatePromotionForm {
    /// Builds the form with the code trimmed and uppercased.
    pub fn new(
        code: Option<&str>,
        discount: PromotionDiscount,
        max_usage: i64,
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> Self {
        let code = code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
        CreatePromotionForm {
            code,
            discount,
            max_usage,
            valid_from,
            valid_until,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(code) = &self.code {
            if code.chars().any(char::is_whitespace) {
                return Err(ValidationError::InvalidFormat {
                    field: "code".to_string(),
                    reason: "must not contain spaces".to_string(),
                });
            }
        }
        match self.discount {
            PromotionDiscount::Percentage(pct) => {
                if pct.is_zero() || pct > Percentage::from_bps(10_000) {
                    return Err(ValidationError::OutOfRange {
                        field: "discount_percentage".to_string(),
                        min: 1,
                        max: 100,
                    });
                }
            }
            PromotionDiscount::Amount(amount) => {
                if !amount.is_positive() {
                    return Err(ValidationError::OutOfRange {
                        field: "discount_amount".to_string(),
                        min: 1,
                        max: i64::MAX,
                    });
                }
            }
        }
        at_least_one("max_usage", self.max_usage)?;
        ordered_dates("valid_from", self.valid_from, "valid_until", self.valid_until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> RegisterForm {
        RegisterForm {
            full_name: "Budi Santoso".into(),
            email: "budi@example.com".into(),
            password: "rahasia".into(),
            confirm_password: "rahasia".into(),
            role: Role::Customer,
            phone_number: None,
            referral_code: Some("RINA01".into()),
        }
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            email: "budi@example.com".into(),
            password: String::new(),
        };
        assert_eq!(form.validate(), Err(ValidationError::required("Password")));

        let form = LoginForm {
            email: "budi".into(),
            password: "x".into(),
        };
        assert!(matches!(form.validate(), Err(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn test_register_form_rules() {
        assert!(register().validate().is_ok());

        let mut form = register();
        form.full_name = "Bu".into();
        assert!(matches!(form.validate(), Err(ValidationError::TooShort { min: 3, .. })));

        let mut form = register();
        form.confirm_password = "rahasiA".into();
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));

        let mut form = register();
        form.password = "abc".into();
        form.confirm_password = "abc".into();
        assert!(matches!(form.validate(), Err(ValidationError::TooShort { min: 6, .. })));
    }

    #[test]
    fn test_register_body_omits_confirmation() {
        let json = serde_json::to_value(register()).unwrap();
        assert!(json.get("confirm_password").is_none());
        assert!(json.get("phone_number").is_none());
        assert_eq!(json["role"], "CUSTOMER");
        assert_eq!(json["referral_code"], "RINA01");
    }

    #[test]
    fn test_password_forms() {
        let change = ChangePasswordForm {
            old_password: String::new(),
            new_password: "newpass".into(),
            confirm_password: "newpass".into(),
        };
        assert_eq!(
            change.validate(),
            Err(ValidationError::required("Current password"))
        );

        let reset = ResetPasswordForm {
            token: "tok".into(),
            new_password: "newpass".into(),
            confirm_password: "newpass".into(),
        };
        assert!(reset.validate().is_ok());
        let body = serde_json::to_value(&reset).unwrap();
        assert_eq!(body, serde_json::json!({"token": "tok", "new_password": "newpass"}));

        assert!(ForgotPasswordForm { email: "x@y.z".into() }.validate().is_ok());
    }

    #[test]
    fn test_transaction_query_validation() {
        assert!(TransactionQuery::default().validate().is_ok());

        let q = TransactionQuery {
            page: 0,
            ..Default::default()
        };
        assert!(q.validate().is_err());

        let q = TransactionQuery {
            limit: 101,
            ..Default::default()
        };
        assert!(q.validate().is_err());

        let q = TransactionQuery {
            date_from: NaiveDate::from_ymd_opt(2026, 10, 2),
            date_to: NaiveDate::from_ymd_opt(2026, 10, 1),
            ..Default::default()
        };
        assert!(matches!(q.validate(), Err(ValidationError::InvalidRange { .. })));
    }

    #[test]
    fn test_transaction_query_omits_absent_filters() {
        let q = TransactionQuery {
            status: Some(TransactionStatus::WaitingPayment),
            ..Default::default()
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"page": 1, "limit": 10, "status": "WAITING_PAYMENT"})
        );
    }

    #[test]
    fn test_status_update() {
        assert!(StatusUpdate::accept().validate().is_ok());
        assert!(StatusUpdate::reject("Blurry receipt").validate().is_ok());
        assert_eq!(
            StatusUpdate::reject("  ").validate(),
            Err(ValidationError::required("Rejection reason"))
        );

        let bogus = StatusUpdate {
            status: TransactionStatus::Expired,
            rejection_reason: None,
        };
        assert!(matches!(bogus.validate(), Err(ValidationError::NotAllowed { .. })));

        let body = serde_json::to_value(StatusUpdate::accept()).unwrap();
        assert_eq!(body, serde_json::json!({"status": "DONE"}));
    }

    #[test]
    fn test_event_query() {
        assert!(EventQuery::default().validate().is_ok());
        assert_eq!(serde_json::to_value(EventQuery::default()).unwrap(), serde_json::json!({}));

        let q = EventQuery {
            city: Some("Bandung".into()),
            is_free: Some(true),
            min_price: Some(Money::from_rupiah(100_000)),
            max_price: Some(Money::from_rupiah(50_000)),
            ..Default::default()
        };
        assert!(matches!(q.validate(), Err(ValidationError::InvalidRange { .. })));

        let q = EventQuery {
            min_price: Some(Money::from_rupiah(-1)),
            ..Default::default()
        };
        assert!(matches!(q.validate(), Err(ValidationError::OutOfRange { .. })));
    }

    fn event_form() -> CreateEventForm {
        serde_json::from_str(
            r#"{"name": "Jazz Night", "description": "Live jazz", "category": "Music",
                "city": "Jakarta", "province": "DKI Jakarta",
                "start_date": "2026-11-01T19:00:00Z", "end_date": "2026-11-01T23:00:00Z",
                "base_price": 50000, "total_seats": 100,
                "ticket_types": [{"name": "Regular", "price": 50000, "quantity": 80},
                                 {"name": "VIP", "price": 150000, "quantity": 20}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_create_event_form() {
        let form = event_form();
        assert!(form.validate().is_ok());

        let mut bad = form.clone();
        bad.end_date = bad.start_date - chrono::Duration::hours(1);
        assert!(matches!(bad.validate(), Err(ValidationError::InvalidRange { .. })));

        let mut bad = form.clone();
        bad.city = " ".into();
        assert_eq!(bad.validate(), Err(ValidationError::required("City")));

        let mut bad = form.clone();
        bad.ticket_types[1].quantity = 0;
        assert!(bad.validate().is_err());

        let mut bad = form;
        bad.image = Some("poster.png".into());
        assert!(matches!(bad.validate(), Err(ValidationError::InvalidFormat { .. })));
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let from: DateTime<Utc> = "2026-10-20T00:00:00Z".parse().unwrap();
        (from, from + chrono::Duration::days(7))
    }

    #[test]
    fn test_create_promotion_body() {
        let (from, until) = window();
        let form = CreatePromotionForm::new(
            Some(" early10 "),
            PromotionDiscount::Percentage(Percentage::from_bps(1000)),
            50,
            from,
            until,
        );
        assert!(form.validate().is_ok());

        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["code"], "EARLY10");
        assert_eq!(body["discount_percentage"], 10.0);
        assert!(body.get("discount_amount").is_none());
        assert_eq!(body["max_usage"], 50);

        let form = CreatePromotionForm::new(
            Some(""),
            PromotionDiscount::Amount(Money::from_rupiah(25_000)),
            1,
            from,
            until,
        );
        let body = serde_json::to_value(&form).unwrap();
        assert!(body.get("code").is_none());
        assert_eq!(body["discount_amount"], 25_000);
        assert!(body.get("discount_percentage").is_none());
    }

    #[test]
    fn test_create_promotion_rules() {
        let (from, until) = window();
        let percent = |bps| PromotionDiscount::Percentage(Percentage::from_bps(bps));

        // Same instant is allowed
        assert!(CreatePromotionForm::new(None, percent(500), 1, from, from).validate().is_ok());

        let reversed = CreatePromotionForm::new(None, percent(500), 1, until, from);
        assert_eq!(
            reversed.validate(),
            Err(ValidationError::InvalidRange {
                from_field: "valid_from".into(),
                to_field: "valid_until".into(),
            })
        );

        assert!(CreatePromotionForm::new(None, percent(0), 1, from, until).validate().is_err());
        assert!(CreatePromotionForm::new(None, percent(10_001), 1, from, until).validate().is_err());
        assert!(CreatePromotionForm::new(None, percent(1000), 0, from, until).validate().is_err());

        let free = PromotionDiscount::Amount(Money::zero());
        assert!(CreatePromotionForm::new(None, free, 1, from, until).validate().is_err());

        let spaced = CreatePromotionForm::new(Some("EARLY BIRD"), percent(1000), 1, from, until);
        assert!(matches!(spaced.validate(), Err(ValidationError::InvalidFormat { .. })));
    }
}
