//! # Event Commands
//!
//! Public browsing: search and filter the catalogue, inspect one event, list
//! the category and location values the filters accept.

use chrono::Utc;
use evently_client::CheckoutApi;

use crate::cli::EventsCommand;
use crate::context::AppContext;
use crate::error::CliResult;
use crate::render;

pub async fn run(ctx: &AppContext, command: EventsCommand) -> CliResult<()> {
    match command {
        EventsCommand::List(args) => {
            let events = ctx.api.list_events(&args.to_query()).await?;
            ctx.output.emit(&events, || render::event_list(&events))
        }
        EventsCommand::Show { id } => {
            let event = ctx.api.get_event(&id).await?;
            let now = Utc::now();
            ctx.output.emit(&event, || render::event_detail(&event, now))
        }
        EventsCommand::Categories => {
            let categories = ctx.api.event_categories().await?;
            ctx.output.emit(&categories, || render::names(&categories, "No categories"))
        }
        EventsCommand::Locations => {
            let locations = ctx.api.event_locations().await?;
            ctx.output.emit(&locations, || render::names(&locations, "No locations"))
        }
    }
}
