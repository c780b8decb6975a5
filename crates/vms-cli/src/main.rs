//! vms - Visitor register from the command line
//!
//! Check visitors in and out, keep the local register reconciled with the
//! published sheet, and stage labels for printing.

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::checkin::{run_checkin, run_edit};
use crate::commands::common::resolve_data_dir;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::hide::{run_checkout, run_hide};
use crate::commands::list::{run_list, run_search};
use crate::commands::queue::run_queue;
use crate::commands::stats::{run_insights, run_stats};
use crate::commands::sync::{run_import, run_sync, run_watch};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vms=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let data_dir = resolve_data_dir(cli.data_dir)?;

    match cli.command {
        Commands::Checkin { visitor } => run_checkin(visitor, &data_dir).await?,
        Commands::Edit { id, visitor } => run_edit(&id, visitor, &data_dir).await?,
        Commands::Hide { id } => run_hide(&id, &data_dir).await?,
        Commands::Checkout { id } => run_checkout(&id, &data_dir).await?,
        Commands::List {
            limit,
            in_building,
            json,
        } => run_list(limit, in_building, json, &data_dir).await?,
        Commands::Search { term, json } => run_search(&term, json, &data_dir).await?,
        Commands::Sync { log } => run_sync(log, &data_dir).await?,
        Commands::Watch { log } => run_watch(log, &data_dir).await?,
        Commands::Import { path } => run_import(&path, &data_dir).await?,
        Commands::Queue { command } => run_queue(command, &data_dir).await?,
        Commands::Stats { json } => run_stats(json, &data_dir).await?,
        Commands::Insights { json } => run_insights(json, &data_dir).await?,
        Commands::Config { command } => run_config(command, &data_dir)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
