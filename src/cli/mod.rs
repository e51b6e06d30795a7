//! Command-line entry: run the server, apply migrations, or export a report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::backend::{self, AppState};
use crate::config::Config;
use crate::database::db::connection::get_db_pool;
use crate::database::db::migrate::run_migrations;

pub mod export;

#[derive(Parser)]
#[command(name = "finance-planner")]
#[command(about = "Personal finance backend: budgets, investments, subscriptions, bills and reports")]
#[command(version)]
pub struct Cli {
    /// Log at debug level regardless of LOG_LEVEL
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Apply database migrations and exit
    Migrate,

    /// Export a user's report to a file
    Export(export::ExportArgs),
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let pool = get_db_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!(database = %config.database_url, "starting server");
            backend::run_server(AppState::new(pool, config)).await
        }
        Commands::Migrate => {
            info!(database = %config.database_url, "migrations applied");
            Ok(())
        }
        Commands::Export(args) => export::execute(args, &pool).await,
    }
}
