//! `tk update`: whole-field replacement on one ticket.

use std::str::FromStr;

use clap::Args;

use tickets_core::{Status, TicketService, TicketUpdate};

use crate::cmd::{fail, ticket_card, ticket_row};
use crate::output::{CliError, OutputMode, render_error, render_mode};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Ticket id, e.g. TICKET-0001.
    pub id: String,

    /// Replace the title.
    #[arg(short, long)]
    pub title: Option<String>,

    /// Replace the description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Replace the whole project set (repeatable).
    #[arg(short, long = "project")]
    pub project: Option<Vec<String>>,

    /// Replace the whole blocked-by set (repeatable).
    #[arg(long = "blocked-by", conflicts_with = "clear_blocked_by")]
    pub blocked_by: Option<Vec<String>>,

    /// Remove every blocked-by entry.
    #[arg(long)]
    pub clear_blocked_by: bool,

    /// Replace the status: open, in-progress, or closed.
    #[arg(short, long)]
    pub status: Option<String>,
}

pub fn run_update(
    args: UpdateArgs,
    service: &TicketService,
    output: OutputMode,
) -> anyhow::Result<()> {
    let status = match args.status.as_deref().map(Status::from_str).transpose() {
        Ok(status) => status,
        Err(parse_err) => {
            let cli_err = CliError::with_details(
                parse_err.to_string(),
                "example: tk update TICKET-0001 --status closed",
                "E2001",
            );
            render_error(output, &cli_err)?;
            anyhow::bail!(cli_err.message);
        }
    };

    let blocked_by = if args.clear_blocked_by {
        Some(Vec::new())
    } else {
        args.blocked_by
    };

    let update = TicketUpdate {
        id: args.id,
        title: args.title,
        description: args.description,
        projects: args.project,
        blocked_by,
        status,
    };
    match service.update_batch(vec![update]) {
        Ok(mut updated) => {
            // Single-item batch: exactly one result.
            let Some(ticket) = updated.pop() else {
                anyhow::bail!("update returned no ticket");
            };
            render_mode(
                output,
                &ticket,
                |t, w| ticket_row(t, w),
                |t, w| ticket_card(t, w),
            )
        }
        Err(err) => fail(output, &err),
    }
}
