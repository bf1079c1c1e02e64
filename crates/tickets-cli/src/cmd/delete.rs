//! `tk delete`: delete a ticket and clean up references to it.

use std::io::Write;

use clap::Args;
use serde::Serialize;

use tickets_core::TicketService;

use crate::cmd::fail;
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Ticket id, e.g. TICKET-0001.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct Deleted {
    id: String,
    deleted: bool,
}

pub fn run_delete(
    args: &DeleteArgs,
    service: &TicketService,
    output: OutputMode,
) -> anyhow::Result<()> {
    match service.delete(&args.id) {
        Ok(()) => {
            let payload = Deleted {
                id: args.id.clone(),
                deleted: true,
            };
            render(output, &payload, |p, w| {
                writeln!(w, "Deleted {} (references cleaned up)", p.id)
            })
        }
        Err(err) => fail(output, &err),
    }
}
