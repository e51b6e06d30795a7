use clap::Parser;
use dotenvy::dotenv;
use finance_planner::cli::{self, Cli};
use finance_planner::config::Config;
use finance_planner::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    init_logging(level)?;

    cli::run(cli, config).await
}
