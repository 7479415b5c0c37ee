//! # Command Line Arguments
//!
//! ```text
//! evently [--config FILE] [--json] <COMMAND>
//!
//!   quote EVENT -t ID=QTY [--promo CODE | --coupon CODE | --points]
//!   checkout EVENT -t ID=QTY [--promo CODE | --coupon CODE | --points]
//!   events list|show|categories|locations
//!   coupon CODE                    points [--history]
//!   transactions list|show|cancel|upload-proof
//!   organizer list|accept|reject|events|create-event|delete-event|promote
//!   login | register | logout | whoami
//!   profile show|update|picture    password change|forgot|reset
//! ```

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use evently_core::forms::{CreatePromotionForm, EventQuery, PromotionDiscount, TransactionQuery};
use evently_core::money::{Money, Percentage};
use evently_core::types::{Role, TransactionStatus};
use evently_core::validation::ValidationResult;
use evently_core::{ValidationError, DEFAULT_PAGE_LIMIT};

#[derive(Debug, Parser)]
#[command(
    name = "evently",
    version,
    about = "Buy event tickets and follow your transactions"
)]
pub struct Cli {
    /// Config file (defaults to client.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a ticket selection without buying
    Quote(SelectionArgs),
    /// Buy tickets
    Checkout(SelectionArgs),
    /// Browse published events
    #[command(subcommand)]
    Events(EventsCommand),
    /// Check whether one of your coupons can be used
    Coupon { code: String },
    /// Show your point balance
    Points {
        /// List every point grant, spent and expired ones included
        #[arg(long)]
        history: bool,
    },
    /// Your transactions
    #[command(subcommand)]
    Transactions(TransactionCommand),
    /// Manage your events and review their payments
    #[command(subcommand)]
    Organizer(OrganizerCommand),
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    #[command(subcommand)]
    Profile(ProfileCommand),
    #[command(subcommand)]
    Password(PasswordCommand),
}

// =============================================================================
// Checkout
// =============================================================================

/// One `--ticket ID=QTY` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSpec {
    pub ticket_type_id: String,
    pub quantity: i64,
}

pub fn parse_ticket_spec(raw: &str) -> Result<TicketSpec, String> {
    let (id, qty) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TICKET_TYPE_ID=QUANTITY, got '{}'", raw))?;
    let id = id.trim();
    if id.is_empty() {
        return Err("ticket type id is empty".to_string());
    }
    let quantity: i64 = qty
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity '{}'", qty.trim()))?;
    if quantity < 1 {
        return Err("quantity must be at least 1".to_string());
    }
    Ok(TicketSpec {
        ticket_type_id: id.to_string(),
        quantity,
    })
}

#[derive(Debug, Args)]
pub struct SelectionArgs {
    pub event_id: String,

    /// TICKET_TYPE_ID=QUANTITY, repeatable
    #[arg(short = 't', long = "ticket", value_parser = parse_ticket_spec)]
    pub tickets: Vec<TicketSpec>,

    /// Event promotion code
    #[arg(long, conflicts_with_all = ["coupon", "points"])]
    pub promo: Option<String>,

    /// One of your coupon codes
    #[arg(long, conflicts_with = "points")]
    pub coupon: Option<String>,

    /// Redeem your whole point balance
    #[arg(long)]
    pub points: bool,
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    List(EventFilterArgs),
    /// Event detail with ticket availability and promotions
    Show { id: String },
    Categories,
    Locations,
}

#[derive(Debug, Clone, Default, Args)]
pub struct EventFilterArgs {
    /// Matches name and description
    pub search: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    /// Free events only
    #[arg(long)]
    pub free: bool,

    /// Rupiah
    #[arg(long)]
    pub min_price: Option<i64>,

    /// Rupiah
    #[arg(long)]
    pub max_price: Option<i64>,
}

impl EventFilterArgs {
    pub fn to_query(&self) -> EventQuery {
        EventQuery {
            search: self.search.clone(),
            category: self.category.clone(),
            city: self.city.clone(),
            is_free: self.free.then_some(true),
            min_price: self.min_price.map(Money::from_rupiah),
            max_price: self.max_price.map(Money::from_rupiah),
        }
    }
}

// =============================================================================
// Transactions
// =============================================================================

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    pub limit: u32,

    /// e.g. WAITING_PAYMENT
    #[arg(long)]
    pub status: Option<TransactionStatus>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl ListArgs {
    pub fn to_query(&self, event_id: Option<String>) -> TransactionQuery {
        TransactionQuery {
            page: self.page,
            limit: self.limit,
            status: self.status,
            date_from: self.from,
            date_to: self.to,
            event_id,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum TransactionCommand {
    List(ListArgs),
    Show {
        id: String,
        /// Keep counting down to the payment deadline
        #[arg(long)]
        watch: bool,
    },
    Cancel {
        id: String,
    },
    /// Upload a payment proof image
    UploadProof {
        id: String,
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum OrganizerCommand {
    List {
        #[command(flatten)]
        filter: ListArgs,
        #[arg(long)]
        event: Option<String>,
    },
    /// Confirm the payment
    Accept { id: String },
    /// Reject the payment proof
    Reject {
        id: String,
        #[arg(long)]
        reason: String,
    },
    /// Your events
    Events,
    /// Create an event from a JSON file
    CreateEvent { file: PathBuf },
    DeleteEvent { id: String },
    /// Add a promotion code to one of your events
    Promote(PromoteArgs),
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD`. Times without
/// an offset are read as UTC.
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD[THH:MM]", raw))
}

#[derive(Debug, Args)]
pub struct PromoteArgs {
    pub event_id: String,

    /// Left out, the server generates one
    #[arg(long)]
    pub code: Option<String>,

    /// Percent off, e.g. 10 or 12.5
    #[arg(long, conflicts_with = "amount", required_unless_present = "amount")]
    pub percent: Option<f64>,

    /// Fixed Rupiah off
    #[arg(long)]
    pub amount: Option<i64>,

    #[arg(long, default_value_t = 100)]
    pub max_usage: i64,

    #[arg(long, value_parser = parse_datetime)]
    pub from: DateTime<Utc>,

    #[arg(long, value_parser = parse_datetime)]
    pub until: DateTime<Utc>,
}

impl PromoteArgs {
    pub fn to_form(&self) -> ValidationResult<CreatePromotionForm> {
        let discount = match (self.percent, self.amount) {
            (Some(pct), _) => PromotionDiscount::Percentage(Percentage::from_percent(pct)),
            (None, Some(amount)) => PromotionDiscount::Amount(Money::from_rupiah(amount)),
            (None, None) => return Err(ValidationError::required("Discount value")),
        };
        let form = CreatePromotionForm::new(
            self.code.as_deref(),
            discount,
            self.max_usage,
            self.from,
            self.until,
        );
        form.validate()?;
        Ok(form)
    }
}

// =============================================================================
// Account
// =============================================================================

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long = "name")]
    pub full_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long = "confirm-password")]
    pub confirm_password: String,
    #[arg(long, default_value = "CUSTOMER")]
    pub role: Role,
    #[arg(long = "phone")]
    pub phone_number: Option<String>,
    /// Someone's referral code
    #[arg(long = "referral")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Show,
    Update {
        #[arg(long = "name")]
        full_name: String,
        #[arg(long = "phone")]
        phone_number: Option<String>,
    },
    /// Upload a profile picture
    Picture { file: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    Change {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Email a reset link
    Forgot {
        #[arg(long)]
        email: String,
    },
    Reset {
        #[arg(long)]
        token: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}
