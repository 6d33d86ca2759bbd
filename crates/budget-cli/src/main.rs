//! Budget CLI - a local-first personal finance tracker
//!
//! This is the command-line interface for Budget Tracker. It provides a
//! user-friendly interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod helpers;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use app::AppContext;
use cli::{Cli, Commands};

/// Log to stderr, filtered by `BUDGET_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("BUDGET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    match &cli.command {
        Some(Commands::Init(args)) => commands::handle_init(&ctx, args),
        Some(Commands::Add(args)) => commands::handle_add(&ctx, args).await,
        Some(Commands::Edit(args)) => commands::handle_edit(&ctx, args).await,
        Some(Commands::Delete(args)) => commands::handle_delete(&ctx, args).await,
        Some(Commands::List(args)) => commands::handle_list(&ctx, args),
        Some(Commands::Budget(command)) => commands::handle_budget(&ctx, command).await,
        Some(Commands::Category(command)) => commands::handle_category(&ctx, command).await,
        Some(Commands::Report(command)) => commands::handle_report(&ctx, command),
        Some(Commands::Export(args)) => commands::handle_export(&ctx, args),
        Some(Commands::Sync) => commands::handle_sync(&ctx).await,
        Some(Commands::Profile(command)) => commands::handle_profile(&ctx, command).await,
        Some(Commands::Completions(args)) => commands::handle_completions(args),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
