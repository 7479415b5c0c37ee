//! # Transaction Commands
//!
//! Customer side: list, inspect, cancel, upload payment proof. `show --watch`
//! keeps counting down to the payment deadline.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use evently_core::countdown::{PaymentCountdown, Tick};
use evently_core::types::Transaction;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::debug;

use crate::cli::TransactionCommand;
use crate::context::AppContext;
use crate::error::CliResult;
use crate::render;

pub async fn run(ctx: &AppContext, command: TransactionCommand) -> CliResult<()> {
    ctx.require_login().await?;

    match command {
        TransactionCommand::List(args) => {
            let page = ctx.api.my_transactions(&args.to_query(None)).await?;
            ctx.output.emit(&page, || render::transaction_page(&page))
        }
        TransactionCommand::Show { id, watch } => show(ctx, &id, watch).await,
        TransactionCommand::Cancel { id } => {
            let transaction = ctx.api.cancel_transaction(&id).await?;
            ctx.output.emit(&transaction, || {
                format!("{} is now {}", transaction.invoice_number, transaction.status.label())
            })
        }
        TransactionCommand::UploadProof { id, file } => {
            let transaction = ctx.api.upload_payment_proof(&id, &file).await?;
            ctx.output.emit(&transaction, || {
                format!(
                    "Payment proof uploaded, {} is now {}",
                    transaction.invoice_number,
                    transaction.status.label()
                )
            })
        }
    }
}

async fn show(ctx: &AppContext, id: &str, watch: bool) -> CliResult<()> {
    let transaction = ctx.api.transaction(id).await?;
    let countdown = PaymentCountdown::for_transaction(&transaction, Utc::now());

    ctx.output.emit(&transaction, || {
        render::transaction_detail(&transaction, countdown.as_ref())
    })?;

    match countdown {
        Some(countdown) if watch && !ctx.output.json => {
            if watch_deadline(countdown).await {
                let refreshed: Transaction = ctx.api.transaction(id).await?;
                println!("Status   {}", refreshed.status.label());
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Countdown
// =============================================================================

/// Something that resolves once per countdown step.
pub(crate) trait Ticker {
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

impl Ticker for Interval {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            Interval::tick(self).await;
        }
    }
}

/// Ticks once per second on stdout until the deadline or Ctrl-C.
///
/// Returns true when the deadline was reached.
async fn watch_deadline(countdown: PaymentCountdown) -> bool {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    let mut stdout = std::io::stdout();
    run_countdown(countdown, &mut interval, tokio::signal::ctrl_c(), &mut stdout).await
}

/// Advances `countdown` on every tick and redraws the line on `out`.
///
/// Stops early, returning false, when `stop` resolves first.
pub(crate) async fn run_countdown<T, S, W>(
    mut countdown: PaymentCountdown,
    ticker: &mut T,
    stop: S,
    out: &mut W,
) -> bool
where
    T: Ticker,
    S: Future,
    W: Write,
{
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut stop => {
                let _ = writeln!(out);
                debug!("Countdown interrupted");
                return false;
            }
        }

        match countdown.tick() {
            Tick::Running(_) => {
                let _ = write!(out, "\rPay within {}", countdown.display());
                let _ = out.flush();
            }
            Tick::Expired | Tick::Stopped => {
                let _ = writeln!(out, "\rPayment window closed");
                return true;
            }
        }
    }
}
