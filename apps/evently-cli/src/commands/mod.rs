//! # Commands
//!
//! One function per subcommand. Each takes the [`AppContext`] and returns
//! `CliResult<()>`; output goes through [`crate::render::Output`].
//!
//! ## Command Categories
//! - `checkout`: quote, checkout, coupon, points
//! - `events`: browse the public catalogue
//! - `transactions`: customer transactions and the payment countdown
//! - `organizer`: payment review, events, promotions
//! - `account`: login, register, logout, whoami, profile, password

pub mod account;
pub mod checkout;
pub mod events;
pub mod organizer;
pub mod transactions;

use crate::cli::Command;
use crate::context::AppContext;
use crate::error::CliResult;

pub async fn dispatch(ctx: &AppContext, command: Command) -> CliResult<()> {
    match command {
        Command::Quote(args) => checkout::quote(ctx, args).await,
        Command::Checkout(args) => checkout::checkout(ctx, args).await,
        Command::Coupon { code } => checkout::check_coupon(ctx, &code).await,
        Command::Events(command) => events::run(ctx, command).await,
        Command::Points { history } => checkout::points(ctx, history).await,
        Command::Transactions(command) => transactions::run(ctx, command).await,
        Command::Organizer(command) => organizer::run(ctx, command).await,
        Command::Login { email, password } => account::login(ctx, email, password).await,
        Command::Register(args) => account::register(ctx, args).await,
        Command::Logout => account::logout(ctx).await,
        Command::Whoami => account::whoami(ctx).await,
        Command::Profile(command) => account::profile(ctx, command).await,
        Command::Password(command) => account::password(ctx, command).await,
    }
}
