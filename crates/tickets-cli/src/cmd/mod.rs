//! One module per `tk` subcommand, each with an `Args` struct and a `run_*`
//! entry point.

pub mod batch;
pub mod completions;
pub mod create;
pub mod delete;
pub mod list;
pub mod migrate;
pub mod next;
pub mod show;
pub mod update;

use std::io::Write;

use tickets_core::{Ticket, TicketError};

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error};

/// Render a core error in the active output mode and fail the command.
pub fn fail(output: OutputMode, err: &TicketError) -> anyhow::Result<()> {
    render_error(output, &CliError::from(err))?;
    anyhow::bail!("{err}")
}

/// One ticket as a compact text row: `id  status  title`.
pub fn ticket_row(ticket: &Ticket, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}  {}  {}",
        ticket.id,
        ticket.status.as_str(),
        ticket.title
    )
}

/// One ticket as a pretty card.
pub fn ticket_card(ticket: &Ticket, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &ticket.id)?;
    pretty_kv(w, "Title", &ticket.title)?;
    pretty_kv(w, "Status", ticket.status.as_str())?;
    if !ticket.projects.is_empty() {
        pretty_kv(w, "Projects", ticket.projects.join(", "))?;
    }
    if !ticket.blocked_by.is_empty() {
        pretty_kv(w, "Blocked by", ticket.blocked_by.join(", "))?;
    }
    pretty_kv(w, "Created", ticket.created_at.to_rfc3339())?;
    pretty_kv(w, "Updated", ticket.updated_at.to_rfc3339())?;
    if !ticket.description.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", ticket.description)?;
    }
    Ok(())
}
