//! `tk show`: show one ticket.

use clap::Args;

use tickets_core::TicketService;

use crate::cmd::{fail, ticket_card, ticket_row};
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Ticket id, e.g. TICKET-0001.
    pub id: String,
}

pub fn run_show(args: &ShowArgs, service: &TicketService, output: OutputMode) -> anyhow::Result<()> {
    match service.read(&args.id) {
        Ok(ticket) => render_mode(
            output,
            &ticket,
            |t, w| ticket_row(t, w),
            |t, w| ticket_card(t, w),
        ),
        Err(err) => fail(output, &err),
    }
}
