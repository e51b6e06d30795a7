use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{deleted, require_name, require_non_negative, require_percentage};
use crate::backend::{AppState, CurrentUser};
use crate::database::db::migrate::recover_missing_table;
use crate::database::db::queries::investments;
use crate::database::models::{AssetClass, Holding, NewAssetClass, NewHolding};
use crate::error::{AppError, Result};
use crate::insights::rebalancing::{portfolio_summary, rebalance, PortfolioSummary, RebalancePlan};
use crate::insights::tax::{tax_location, tax_loss_harvesting, HarvestOpportunity, TaxLocationSuggestion};
use crate::util::now;

/*==========Asset Classes=========== */

fn validate_asset_class(new: &NewAssetClass) -> Result<()> {
    require_name("name", &new.name)?;
    require_percentage("target_percentage", new.target_percentage)
}

// GET /api/asset-classes
pub async fn list_asset_classes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<AssetClass>>> {
    let rows = recover_missing_table(&state.db, "asset_classes", || {
        investments::list_asset_classes(&state.db, &user.id)
    })
    .await?;
    Ok(Json(rows))
}

// POST /api/asset-classes
pub async fn create_asset_class(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewAssetClass>,
) -> Result<(StatusCode, Json<AssetClass>)> {
    validate_asset_class(&new)?;
    let class = investments::create_asset_class(&state.db, &user.id, &new).await?;
    info!(user_id = %user.id, asset_class_id = class.id, "asset class created");
    Ok((StatusCode::CREATED, Json(class)))
}

// PUT /api/asset-classes/:id
pub async fn update_asset_class(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(new): Json<NewAssetClass>,
) -> Result<Json<AssetClass>> {
    validate_asset_class(&new)?;
    Ok(Json(investments::update_asset_class(&state.db, &user.id, id, &new).await?))
}

// DELETE /api/asset-classes/:id
pub async fn delete_asset_class(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    deleted(investments::delete_asset_class(&state.db, &user.id, id).await?, "Asset class")
}

/*==========Holdings=========== */

fn validate_holding(new: &NewHolding) -> Result<()> {
    require_name("symbol", &new.symbol)?;
    require_name("name", &new.name)?;
    require_non_negative("quantity", new.quantity)?;
    require_non_negative("cost_basis", new.cost_basis)?;
    require_non_negative("current_price", new.current_price)
}

fn asset_class_not_found(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::RowNotFound => AppError::not_found("Asset class"),
        other => other.into(),
    }
}

// GET /api/investments
pub async fn list_holdings(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<Holding>>> {
    let rows = recover_missing_table(&state.db, "investments", || {
        investments::list_holdings(&state.db, &user.id)
    })
    .await?;
    Ok(Json(rows))
}

// POST /api/investments
pub async fn create_holding(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewHolding>,
) -> Result<(StatusCode, Json<Holding>)> {
    validate_holding(&new)?;
    let holding = investments::create_holding(&state.db, &user.id, &new, now())
        .await
        .map_err(asset_class_not_found)?;
    info!(user_id = %user.id, holding_id = holding.id, symbol = %holding.symbol, "holding added");
    Ok((StatusCode::CREATED, Json(holding)))
}

// PUT /api/investments/:id
pub async fn update_holding(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(new): Json<NewHolding>,
) -> Result<Json<Holding>> {
    validate_holding(&new)?;
    investments::get_holding(&state.db, &user.id, id).await?;
    let holding = investments::update_holding(&state.db, &user.id, id, &new, now())
        .await
        .map_err(asset_class_not_found)?;
    Ok(Json(holding))
}

// DELETE /api/investments/:id
pub async fn delete_holding(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    deleted(investments::delete_holding(&state.db, &user.id, id).await?, "Holding")
}

/*==========Advice=========== */

// GET /api/investments/summary
pub async fn summary(State(state): State<AppState>, user: CurrentUser) -> Result<Json<PortfolioSummary>> {
    let holdings = investments::list_holdings(&state.db, &user.id).await?;
    Ok(Json(portfolio_summary(&holdings)))
}

#[derive(Debug, Deserialize)]
pub struct RebalanceQuery {
    /// Percentage points; falls back to the configured threshold.
    pub threshold: Option<Decimal>,
}

// GET /api/investments/rebalance?threshold=
pub async fn rebalance_plan(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RebalanceQuery>,
) -> Result<Json<RebalancePlan>> {
    let threshold = query.threshold.unwrap_or(state.config.rebalance_threshold);
    require_percentage("threshold", threshold)?;

    let holdings = investments::list_holdings(&state.db, &user.id).await?;
    let targets = investments::list_asset_classes(&state.db, &user.id).await?;
    Ok(Json(rebalance(&holdings, &targets, threshold)))
}

// GET /api/investments/tax-location
pub async fn tax_location_advice(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TaxLocationSuggestion>>> {
    let holdings = investments::list_holdings(&state.db, &user.id).await?;
    Ok(Json(tax_location(&holdings, state.config.tax_rate)))
}

#[derive(Debug, Deserialize)]
pub struct HarvestQuery {
    pub min_loss: Option<Decimal>,
}

// GET /api/investments/tax-loss-harvesting?min_loss=
pub async fn harvesting(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<HarvestQuery>,
) -> Result<Json<Vec<HarvestOpportunity>>> {
    let min_loss = query.min_loss.unwrap_or(Decimal::ONE_HUNDRED);
    require_non_negative("min_loss", min_loss)?;

    let holdings = investments::list_holdings(&state.db, &user.id).await?;
    Ok(Json(tax_loss_harvesting(&holdings, min_loss, state.config.tax_rate)))
}
