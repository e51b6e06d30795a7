use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::backend::{AppState, CurrentUser};
use crate::database::db::queries::{bills, budgets, investments, subscriptions};
use crate::database::models::BillFilter;
use crate::error::{AppError, Result};
use crate::insights::subscriptions::RENEWAL_WINDOW_DAYS;
use crate::reports::{self, build_dashboard, export_report, Dashboard, ExportFormat, MonthlyReport, ReportRange};
use crate::util::today;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// GET /api/reports/monthly?from=&to=
pub async fn monthly(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<MonthlyReport>> {
    let range = ReportRange::resolve(query.from, query.to, today())?;
    let (report, _) = reports::load_range(&state.db, &user.id, range).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// GET /api/reports/export?format=csv|json|xlsx|pdf&from=&to=
pub async fn export(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse> {
    let format: ExportFormat = query
        .format
        .as_deref()
        .unwrap_or("csv")
        .parse()
        .map_err(AppError::Validation)?;
    let range = ReportRange::resolve(query.from, query.to, today())?;

    let (report, transactions) = reports::load_range(&state.db, &user.id, range).await?;
    let file = export_report(&report, &transactions, format)?;
    info!(user_id = %user.id, file = %file.file_name, bytes = file.bytes.len(), "report exported");

    Ok((
        [
            (CONTENT_TYPE, file.content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    ))
}

// GET /api/dashboard
pub async fn dashboard(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Dashboard>> {
    let today = today();
    let month = reports::load_range(&state.db, &user.id, ReportRange::month_of(today)).await?.1;
    let active_budgets = budgets::count_active_budgets(&state.db, &user.id, today).await?;
    let open_bills = bills::list_bills(
        &state.db,
        &user.id,
        &BillFilter {
            status: None,
            upcoming_days: Some(RENEWAL_WINDOW_DAYS as u32),
        },
        today,
    )
    .await?;
    let subs = subscriptions::list_subscriptions(&state.db, &user.id, None).await?;
    let holdings = investments::list_holdings(&state.db, &user.id).await?;

    Ok(Json(build_dashboard(
        today,
        &month,
        active_budgets,
        open_bills,
        &subs,
        &holdings,
    )))
}
