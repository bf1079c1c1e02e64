//! `tk batch`: all-or-nothing bulk creates and updates from a JSON array.

use std::io::{Read, Write};

use clap::{Args, Subcommand};

use tickets_core::{NewTicket, Ticket, TicketService, TicketUpdate};

use crate::cmd::{fail, ticket_row};
use crate::output::{CliError, OutputMode, render_error, render_mode};

#[derive(Args, Debug)]
pub struct BatchArgs {
    #[command(subcommand)]
    pub op: BatchOp,
}

#[derive(Subcommand, Debug)]
pub enum BatchOp {
    /// Create several tickets from a JSON array of {title, description, ...}.
    Create(BatchInput),
    /// Update several tickets from a JSON array of {id, ...fields}.
    Update(BatchInput),
}

#[derive(Args, Debug)]
pub struct BatchInput {
    /// Path to the JSON array, or '-' for stdin.
    #[arg(long, default_value = "-")]
    pub file: String,
}

pub fn run_batch(args: &BatchArgs, service: &TicketService, output: OutputMode) -> anyhow::Result<()> {
    match &args.op {
        BatchOp::Create(input) => {
            let items: Vec<NewTicket> = read_items(&input.file, output)?;
            match service.create_batch(items) {
                Ok(created) => render_results("created", &created, output),
                Err(err) => fail(output, &err),
            }
        }
        BatchOp::Update(input) => {
            let updates: Vec<TicketUpdate> = read_items(&input.file, output)?;
            match service.update_batch(updates) {
                Ok(updated) => render_results("updated", &updated, output),
                Err(err) => fail(output, &err),
            }
        }
    }
}

/// Read and parse the JSON array from a file or stdin.
fn read_items<T: serde::de::DeserializeOwned>(
    file: &str,
    output: OutputMode,
) -> anyhow::Result<Vec<T>> {
    let raw = if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };

    match serde_json::from_str(&raw) {
        Ok(items) => Ok(items),
        Err(parse_err) => {
            let cli_err = CliError::with_details(
                format!("batch input is not a valid JSON array: {parse_err}"),
                "expected e.g. [{\"title\": \"...\", \"description\": \"...\"}]",
                "E2001",
            );
            render_error(output, &cli_err)?;
            anyhow::bail!(cli_err.message)
        }
    }
}

fn render_results(verb: &str, tickets: &[Ticket], output: OutputMode) -> anyhow::Result<()> {
    render_mode(
        output,
        &tickets,
        |tickets, w| {
            for ticket in *tickets {
                ticket_row(ticket, w)?;
            }
            Ok(())
        },
        |tickets, w| {
            writeln!(w, "{} ticket(s) {verb}", tickets.len())?;
            for ticket in *tickets {
                ticket_row(ticket, w)?;
            }
            Ok(())
        },
    )
}
