use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{deleted, require_name, require_non_negative};
use crate::backend::{AppState, CurrentUser};
use crate::database::db::migrate::recover_missing_table;
use crate::database::db::queries::{budgets, transactions};
use crate::database::models::{Budget, BudgetMethod, NewBudget};
use crate::error::{AppError, Result};
use crate::insights::budget_recommendation::{analyze_spending, recommend, BudgetRecommendation, SpendingRecord};
use crate::reports::{budget_progress, BudgetProgress};
use crate::util::{now, today};

const DEFAULT_LOOKBACK_MONTHS: u32 = 6;
const MAX_LOOKBACK_MONTHS: u32 = 36;

fn validate(new: &NewBudget) -> Result<()> {
    require_name("name", &new.name)?;
    if new.period_end < new.period_start {
        return Err(AppError::validation("period_end must not be before period_start"));
    }
    require_non_negative("income", new.income)?;
    for line in &new.categories {
        require_non_negative("allocated_amount", line.allocated_amount)?;
    }
    Ok(())
}

// GET /api/budgets
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<Budget>>> {
    let rows = recover_missing_table(&state.db, "budgets", || {
        budgets::list_budgets(&state.db, &user.id)
    })
    .await?;
    Ok(Json(rows))
}

// POST /api/budgets
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewBudget>,
) -> Result<(StatusCode, Json<Budget>)> {
    validate(&new)?;
    let budget = budgets::create_budget(&state.db, &user.id, &new, now())
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::not_found("Category"),
            other => other.into(),
        })?;
    info!(user_id = %user.id, budget_id = budget.id, lines = budget.categories.len(), "budget created");
    Ok((StatusCode::CREATED, Json(budget)))
}

// GET /api/budgets/:id
pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Budget>> {
    Ok(Json(budgets::get_budget(&state.db, &user.id, id).await?))
}

// PUT /api/budgets/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(new): Json<NewBudget>,
) -> Result<Json<Budget>> {
    validate(&new)?;
    let budget = budgets::update_budget(&state.db, &user.id, id, &new).await?;
    info!(user_id = %user.id, budget_id = id, "budget updated");
    Ok(Json(budget))
}

// DELETE /api/budgets/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    deleted(budgets::delete_budget(&state.db, &user.id, id).await?, "Budget")
}

// GET /api/budgets/:id/progress
pub async fn progress(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<BudgetProgress>> {
    let budget = budgets::get_budget(&state.db, &user.id, id).await?;
    let spending =
        transactions::list_between(&state.db, &user.id, budget.period_start, budget.period_end).await?;
    Ok(Json(budget_progress(&budget, &spending)))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub income: Decimal,
    #[serde(default)]
    pub method: BudgetMethod,
    /// Months of history to analyse, counting back from `as_of`.
    pub lookback_months: Option<u32>,
    pub as_of: Option<NaiveDate>,
}

// POST /api/budgets/recommendations
pub async fn recommendations(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<RecommendationRequest>,
) -> Result<Json<BudgetRecommendation>> {
    require_non_negative("income", req.income)?;
    let lookback = req.lookback_months.unwrap_or(DEFAULT_LOOKBACK_MONTHS);
    if lookback == 0 || lookback > MAX_LOOKBACK_MONTHS {
        return Err(AppError::validation(format!(
            "lookback_months must be between 1 and {}",
            MAX_LOOKBACK_MONTHS
        )));
    }

    let as_of = req.as_of.unwrap_or_else(today);
    let from = as_of
        .checked_sub_months(Months::new(lookback))
        .and_then(|d| d.succ_opt())
        .unwrap_or(as_of);

    let history = transactions::list_between(&state.db, &user.id, from, as_of).await?;
    let analysis = analyze_spending(&SpendingRecord::from_transactions(&history), as_of);
    Ok(Json(recommend(&analysis, req.income, req.method)))
}
