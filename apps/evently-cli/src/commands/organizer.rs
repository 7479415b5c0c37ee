//! # Organizer Commands
//!
//! Payment review for incoming transactions, plus event and promotion
//! management. Every command needs an organizer account.

use std::path::Path;

use evently_core::forms::{CreateEventForm, StatusUpdate};
use tracing::info;

use crate::cli::{OrganizerCommand, PromoteArgs};
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::render;

pub async fn run(ctx: &AppContext, command: OrganizerCommand) -> CliResult<()> {
    ctx.require_organizer().await?;

    match command {
        OrganizerCommand::List { filter, event } => {
            let page = ctx.api.organizer_transactions(&filter.to_query(event)).await?;
            ctx.output.emit(&page, || render::transaction_page(&page))
        }
        OrganizerCommand::Accept { id } => review(ctx, &id, StatusUpdate::accept()).await,
        OrganizerCommand::Reject { id, reason } => {
            review(ctx, &id, StatusUpdate::reject(reason)).await
        }
        OrganizerCommand::Events => {
            let events = ctx.api.my_events().await?;
            ctx.output.emit(&events, || render::event_list(&events))
        }
        OrganizerCommand::CreateEvent { file } => create_event(ctx, &file).await,
        OrganizerCommand::DeleteEvent { id } => {
            ctx.api.delete_event(&id).await?;
            ctx.output.message(&format!("Event {} deleted", id))
        }
        OrganizerCommand::Promote(args) => promote(ctx, &args).await,
    }
}

async fn review(ctx: &AppContext, id: &str, update: StatusUpdate) -> CliResult<()> {
    let transaction = ctx.api.update_transaction_status(id, &update).await?;
    info!(transaction_id = %transaction.id, status = %transaction.status, "Payment reviewed");
    ctx.output.emit(&transaction, || {
        format!("{} marked {}", transaction.invoice_number, transaction.status.label())
    })
}

/// Reads a `POST /events` body from a JSON file.
pub(crate) async fn read_event_form(path: &Path) -> CliResult<CreateEventForm> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CliError::validation(format!("Cannot read {}: {}", path.display(), e)))?;
    let form: CreateEventForm = serde_json::from_slice(&bytes)
        .map_err(|e| CliError::validation(format!("Invalid event file {}: {}", path.display(), e)))?;
    form.validate()?;
    Ok(form)
}

async fn create_event(ctx: &AppContext, file: &Path) -> CliResult<()> {
    let form = read_event_form(file).await?;
    let event = ctx.api.create_event(&form).await?;
    ctx.output.emit(&event, || format!("Created {} ({})", event.name, event.id))
}

async fn promote(ctx: &AppContext, args: &PromoteArgs) -> CliResult<()> {
    let form = args.to_form()?;
    let promotion = ctx.api.create_promotion(&args.event_id, &form).await?;
    ctx.output.emit(&promotion, || {
        format!(
            "Promotion {} ({}) is live for event {}",
            promotion.code,
            promotion.rule().describe(),
            args.event_id
        )
    })
}
