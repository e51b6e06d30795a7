use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::Args;
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::database::db::queries::users;
use crate::reports::{self, export_report, ExportFormat, ReportRange};
use crate::util::{parse_date_any, today};

#[derive(Args)]
pub struct ExportArgs {
    /// Email of the account to export
    #[arg(long)]
    pub email: String,

    /// Output format (csv, json, xlsx, pdf)
    #[arg(short, long, default_value = "csv")]
    pub format: String,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the range (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub to: Option<String>,

    /// Output file path, defaults to the generated file name
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_opt_date(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|v| parse_date_any(v).ok_or_else(|| anyhow!("Invalid date for {}: {}", flag, v)))
        .transpose()
}

pub async fn execute(args: ExportArgs, pool: &Pool<Sqlite>) -> Result<()> {
    let format: ExportFormat = args.format.parse().map_err(anyhow::Error::msg)?;
    let from = parse_opt_date("--from", args.from.as_deref())?;
    let to = parse_opt_date("--to", args.to.as_deref())?;
    let range = ReportRange::resolve(from, to, today())?;

    let email = args.email.trim().to_lowercase();
    let (user, _) = users::find_credentials_by_email(pool, &email)
        .await?
        .ok_or_else(|| anyhow!("No account registered for {}", email))?;

    let (report, transactions) = reports::load_range(pool, &user.id, range).await?;
    let file = export_report(&report, &transactions, format)?;

    let path = args.output.unwrap_or_else(|| PathBuf::from(&file.file_name));
    tokio::fs::write(&path, &file.bytes).await?;
    info!(
        path = %path.display(),
        transactions = transactions.len(),
        bytes = file.bytes.len(),
        "report exported"
    );

    Ok(())
}
