//! `tk create`: create a new ticket.

use clap::Args;

use tickets_core::{NewTicket, TicketService};

use crate::cmd::{fail, ticket_card, ticket_row};
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Title of the new ticket.
    #[arg(short, long)]
    pub title: String,

    /// Description text.
    #[arg(short, long)]
    pub description: String,

    /// Projects this ticket belongs to (repeatable).
    #[arg(short, long = "project")]
    pub project: Vec<String>,

    /// Ids of tickets that must close before this one is ready (repeatable).
    #[arg(long = "blocked-by")]
    pub blocked_by: Vec<String>,
}

pub fn run_create(
    args: CreateArgs,
    service: &TicketService,
    output: OutputMode,
) -> anyhow::Result<()> {
    let new = NewTicket {
        title: args.title,
        description: args.description,
        projects: args.project,
        blocked_by: args.blocked_by,
    };
    match service.create(new) {
        Ok(ticket) => render_mode(
            output,
            &ticket,
            |t, w| ticket_row(t, w),
            |t, w| ticket_card(t, w),
        ),
        Err(err) => fail(output, &err),
    }
}
