#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tickets_core::{MigrationManager, TicketService};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tickets: dependency-aware ticket tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to the ticket document (default: $TICKETS_FILE, then ./tickets.json).
    #[arg(long)]
    file: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for --format json).
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Lifecycle",
        about = "Create a new ticket",
        long_about = "Create a new ticket; its blocked-by targets must already exist.",
        after_help = "EXAMPLES:\n    # Create a standalone ticket\n    tk create --title \"Fix login timeout\" --description \"Session expires too early\"\n\n    # Create a ticket blocked by two others\n    tk create --title \"Ship auth\" --description \"...\" --blocked-by TICKET-0001 --blocked-by TICKET-0002\n\n    # Emit machine-readable output\n    tk create --title \"Fix login timeout\" --description \"...\" --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one ticket",
        after_help = "EXAMPLES:\n    tk show TICKET-0001\n    tk show TICKET-0001 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "List tickets",
        long_about = "List tickets, newest first, with optional conjunctive filters.",
        after_help = "EXAMPLES:\n    # Everything, newest first\n    tk list\n\n    # Open tickets in one project\n    tk list --project platform --status open\n\n    # Everything waiting on one ticket\n    tk list --depends-on TICKET-0001"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show ready work and what it unblocks",
        long_about = "Show tickets whose blockers are all closed, each with the cascade of tickets it unblocks.",
        after_help = "EXAMPLES:\n    tk next\n    tk next --project platform\n    tk next --json"
    )]
    Next(cmd::next::NextArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Update fields on one ticket",
        long_about = "Replace whole fields on a ticket; omitted flags leave fields untouched.",
        after_help = "EXAMPLES:\n    # Close a ticket\n    tk update TICKET-0001 --status closed\n\n    # Replace the blocked-by set\n    tk update TICKET-0003 --blocked-by TICKET-0001 --blocked-by TICKET-0002\n\n    # Drop all blockers\n    tk update TICKET-0003 --clear-blocked-by"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Delete a ticket",
        long_about = "Delete a ticket and strip its id from every other ticket's blocked-by set.",
        after_help = "EXAMPLES:\n    tk delete TICKET-0001"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Bulk create or update from a JSON array",
        long_about = "Apply a JSON array of creates or updates as one all-or-nothing batch.",
        after_help = "EXAMPLES:\n    # Create several tickets from a file\n    tk batch create --file tickets-to-create.json\n\n    # Update from stdin\n    echo '[{\"id\": \"TICKET-0001\", \"status\": \"closed\"}]' | tk batch update"
    )]
    Batch(cmd::batch::BatchArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Run pending document migrations",
        long_about = "Detect the document's schema version and migrate it to the current one, writing a backup per step. Data commands also do this automatically.",
        after_help = "EXAMPLES:\n    tk migrate\n    tk migrate --json"
    )]
    Migrate(cmd::migrate::MigrateArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    tk completions bash\n    tk completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = resolve_output_mode(cli.format, cli.json);

    // Completions need no document at all.
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let path = resolve_document_path(cli.file, output)?;
    tracing::debug!(path = %path.display(), "using ticket document");

    // Explicit migrate reports its own outcome.
    if let Commands::Migrate(args) = &cli.command {
        return cmd::migrate::run_migrate(args, &path, output);
    }

    // Every data command runs strictly after the document is current;
    // a failed migration halts before any command logic.
    if let Err(err) = MigrationManager::new().ensure_current(&path) {
        render_error(output, &CliError::from(&err))?;
        anyhow::bail!("{err}");
    }

    let service = TicketService::open(&path);
    match cli.command {
        Commands::Create(args) => cmd::create::run_create(args, &service, output),
        Commands::Show(args) => cmd::show::run_show(&args, &service, output),
        Commands::List(args) => cmd::list::run_list(&args, &service, output),
        Commands::Next(args) => cmd::next::run_next(&args, &service, output),
        Commands::Update(args) => cmd::update::run_update(args, &service, output),
        Commands::Delete(args) => cmd::delete::run_delete(&args, &service, output),
        Commands::Batch(args) => cmd::batch::run_batch(&args, &service, output),
        // Both dispatched above, before the service existed.
        Commands::Migrate(_) | Commands::Completions(_) => Ok(()),
    }
}

/// Resolve the document path: `--file` flag, then `TICKETS_FILE`, then
/// `./tickets.json`. The path must end in `.json`.
fn resolve_document_path(flag: Option<PathBuf>, output: OutputMode) -> anyhow::Result<PathBuf> {
    let path = flag
        .or_else(|| std::env::var_os("TICKETS_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("tickets.json"));

    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        let err = CliError::with_details(
            format!("ticket file must be a .json path, got '{}'", path.display()),
            "pass --file ./tickets.json or set TICKETS_FILE",
            "E2001",
        );
        render_error(output, &err)?;
        anyhow::bail!(err.message);
    }
    Ok(path)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
