//! `tk list`: list tickets with optional filters.

use std::io::Write;
use std::str::FromStr;

use clap::Args;

use tickets_core::{ListFilter, Status, Ticket, TicketService};

use crate::cmd::{fail, ticket_row};
use crate::output::{CliError, OutputMode, pretty_rule, render_error, render_mode};

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only tickets in this project (case-insensitive).
    #[arg(short, long)]
    pub project: Option<String>,

    /// Only tickets with this status: open, in-progress, or closed.
    #[arg(short, long)]
    pub status: Option<String>,

    /// Only tickets blocked by this id.
    #[arg(long = "depends-on")]
    pub depends_on: Option<String>,
}

pub fn run_list(args: &ListArgs, service: &TicketService, output: OutputMode) -> anyhow::Result<()> {
    let status = match args.status.as_deref().map(Status::from_str).transpose() {
        Ok(status) => status,
        Err(parse_err) => {
            let cli_err = CliError::with_details(
                parse_err.to_string(),
                "example: tk list --status in-progress",
                "E2001",
            );
            render_error(output, &cli_err)?;
            anyhow::bail!(cli_err.message);
        }
    };

    let filter = ListFilter {
        project: args.project.clone(),
        status,
        depends_on: args.depends_on.clone(),
    };
    match service.list(&filter) {
        Ok(tickets) => render_mode(
            output,
            &tickets,
            |tickets, w| render_rows(tickets, w),
            |tickets, w| render_table(tickets, w),
        ),
        Err(err) => fail(output, &err),
    }
}

fn render_rows(tickets: &[Ticket], w: &mut dyn Write) -> std::io::Result<()> {
    for ticket in tickets {
        ticket_row(ticket, w)?;
    }
    Ok(())
}

fn render_table(tickets: &[Ticket], w: &mut dyn Write) -> std::io::Result<()> {
    if tickets.is_empty() {
        return writeln!(w, "(no tickets match)");
    }

    writeln!(w, "{:<14}  {:<12}  {:<24}  TITLE", "ID", "STATUS", "PROJECTS")?;
    pretty_rule(w)?;
    for ticket in tickets {
        writeln!(
            w,
            "{:<14}  {:<12}  {:<24}  {}",
            ticket.id,
            ticket.status.as_str(),
            ticket.projects.join(","),
            ticket.title
        )?;
    }
    Ok(())
}
