//! `tk next`: ready work, with the cascade of tickets each one unblocks.

use std::io::Write;

use clap::Args;
use serde::Serialize;

use tickets_core::{NextTicket, ResearchNode, TicketService};

use crate::cmd::fail;
use crate::output::{OutputMode, pretty_section, render, render_mode};

#[derive(Args, Debug, Default)]
pub struct NextArgs {
    /// Only ready tickets in this project (case-insensitive).
    #[arg(short, long)]
    pub project: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmptyNext {
    message: String,
}

pub fn run_next(args: &NextArgs, service: &TicketService, output: OutputMode) -> anyhow::Result<()> {
    match service.next(args.project.as_deref()) {
        Ok(ready) if ready.is_empty() => {
            let empty = EmptyNext {
                message: "No tickets are currently ready".to_string(),
            };
            render(output, &empty, |_, w| {
                writeln!(w, "(no tickets ready right now)")
            })
        }
        Ok(ready) => render_mode(
            output,
            &ready,
            |ready, w| render_text(ready, w),
            |ready, w| render_pretty(ready, w),
        ),
        Err(err) => fail(output, &err),
    }
}

fn render_text(ready: &[NextTicket], w: &mut dyn Write) -> std::io::Result<()> {
    for ticket in ready {
        writeln!(w, "{}  ready  {}", ticket.id, ticket.title)?;
        for child in &ticket.research_tree.unblocks {
            render_tree_text(child, 1, w)?;
        }
    }
    Ok(())
}

fn render_tree_text(node: &ResearchNode, depth: usize, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{:indent$}unblocks  {}  {}",
        "",
        node.id,
        node.title,
        indent = depth * 2
    )?;
    for child in &node.unblocks {
        render_tree_text(child, depth + 1, w)?;
    }
    Ok(())
}

fn render_pretty(ready: &[NextTicket], w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Ready work")?;
    for ticket in ready {
        writeln!(w, "{}  {}", ticket.id, ticket.title)?;
        if !ticket.projects.is_empty() {
            writeln!(w, "    projects: {}", ticket.projects.join(", "))?;
        }
        if ticket.research_tree.unblocks.is_empty() {
            writeln!(w, "    unblocks: (nothing)")?;
        } else {
            writeln!(w, "    unblocks:")?;
            for child in &ticket.research_tree.unblocks {
                render_tree_pretty(child, 2, w)?;
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

fn render_tree_pretty(node: &ResearchNode, depth: usize, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{:indent$}-> {}  {}",
        "",
        node.id,
        node.title,
        indent = depth * 4
    )?;
    for child in &node.unblocks {
        render_tree_pretty(child, depth + 1, w)?;
    }
    Ok(())
}
