pub mod export;
pub mod summary;

pub use export::{export_report, ExportFile, ExportFormat};
pub use summary::{
    budget_progress, build_dashboard, monthly_report, BudgetProgress, Dashboard, MonthlyReport,
};

use chrono::{Months, NaiveDate};
use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::database::db::queries::transactions;
use crate::database::models::Transaction;
use crate::error::{AppError, Result};
use crate::util::{first_of_month, last_of_month};

/// Months covered when no `from` is given.
const DEFAULT_MONTHS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportRange {
    /// Missing `to` means today; missing `from` means the start of the month
    /// six months back from `to` (inclusive).
    pub fn resolve(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> Result<Self> {
        let to = to.unwrap_or(today);
        let from = from.unwrap_or_else(|| {
            first_of_month(to)
                .checked_sub_months(Months::new(DEFAULT_MONTHS - 1))
                .unwrap_or(to)
        });
        if from > to {
            return Err(AppError::validation("from must not be after to"));
        }
        Ok(Self { from, to })
    }

    pub fn month_of(day: NaiveDate) -> Self {
        Self {
            from: first_of_month(day),
            to: last_of_month(day),
        }
    }
}

/// Transactions in `range` plus the monthly report built from them.
pub async fn load_range(
    pool: &Pool<Sqlite>,
    user_id: &str,
    range: ReportRange,
) -> Result<(MonthlyReport, Vec<Transaction>)> {
    let rows = transactions::list_between(pool, user_id, range.from, range.to).await?;
    let report = monthly_report(&rows, range.from, range.to);
    Ok((report, rows))
}
