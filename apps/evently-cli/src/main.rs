//! # Evently CLI Entry Point
//!
//! The actual setup is in lib.rs so commands stay testable.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    evently_cli::run().await
}
