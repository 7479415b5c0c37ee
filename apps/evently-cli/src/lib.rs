//! # Evently CLI
//!
//! Command line front end for ticket checkout and transaction tracking.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           evently                                       │
//! │                                                                         │
//! │  main.rs ──────► run()                                                 │
//! │                                                                         │
//! │  lib.rs ───────► tracing, argument parsing, exit codes                 │
//! │                                                                         │
//! │  context.rs ───► ClientConfig + SessionStore + HttpApi                 │
//! │                                                                         │
//! │  commands/ ────► checkout, events, transactions, organizer, account    │
//! │                                                                         │
//! │  render.rs ────► text summaries or JSON                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (stderr, `RUST_LOG` aware)
//! 3. Load config and hydrate the stored session
//! 4. Run the command
//! 5. Map failures to an exit code

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod render;

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, Subscriber};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::context::AppContext;
use crate::error::CliError;
use crate::render::Output;

/// Parses the command line, runs the command and reports failures.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let output = Output { json: cli.json };
    match execute(cli, output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, output);
            ExitCode::from(err.exit_code())
        }
    }
}

async fn execute(cli: Cli, output: Output) -> Result<(), CliError> {
    let ctx = AppContext::init(cli.config, output).await?;
    debug!(base_url = %ctx.api.base_url(), "Client ready");
    commands::dispatch(&ctx, cli.command).await
}

fn report(err: &CliError, output: Output) {
    if output.json {
        match serde_json::to_string_pretty(err) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", err),
        }
    } else {
        eprintln!("error: {}", err);
    }
}

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,evently=debug,reqwest=warn";

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` for development
/// - `RUST_LOG=evently=trace` for detailed crate logs
/// - Default: `info,evently=debug,reqwest=warn`
///
/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    subscriber(filter).init();
}

/// Builds the stderr subscriber. The filter alone decides what is enabled.
fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_filter_silences_http_internals() {
        let sub = subscriber(EnvFilter::new(DEFAULT_FILTER));
        tracing::subscriber::with_default(sub, || {
            assert!(!tracing::enabled!(target: "reqwest::connect", Level::TRACE));
            assert!(!tracing::enabled!(target: "reqwest::connect", Level::DEBUG));
            assert!(tracing::enabled!(target: "reqwest::connect", Level::WARN));
            assert!(!tracing::enabled!(target: "hyper_util::client", Level::DEBUG));
            assert!(tracing::enabled!(target: "hyper_util::client", Level::INFO));
        });
    }

    #[test]
    fn test_default_filter_keeps_crate_debug() {
        let sub = subscriber(EnvFilter::new(DEFAULT_FILTER));
        tracing::subscriber::with_default(sub, || {
            assert!(tracing::enabled!(target: "evently_client::http", Level::DEBUG));
            assert!(tracing::enabled!(target: "evently_cli", Level::DEBUG));
            assert!(!tracing::enabled!(target: "evently_cli", Level::TRACE));
        });
    }
}
