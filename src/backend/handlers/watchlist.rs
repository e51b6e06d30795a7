use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::{deleted, require_name, require_positive};
use crate::backend::{AppState, CurrentUser};
use crate::database::db::migrate::recover_missing_table;
use crate::database::db::queries::watchlist;
use crate::database::models::{NewWatchlistItem, WatchlistItem};
use crate::error::Result;
use crate::util::now;

fn validate(new: &NewWatchlistItem) -> Result<()> {
    require_name("symbol", &new.symbol)?;
    if let Some(target) = new.target_price {
        require_positive("target_price", target)?;
    }
    Ok(())
}

// GET /api/watchlist
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<WatchlistItem>>> {
    let rows = recover_missing_table(&state.db, "watchlist", || {
        watchlist::list_items(&state.db, &user.id)
    })
    .await?;
    Ok(Json(rows))
}

// POST /api/watchlist
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewWatchlistItem>,
) -> Result<(StatusCode, Json<WatchlistItem>)> {
    validate(&new)?;
    let item = watchlist::add_item(&state.db, &user.id, &new, now()).await?;
    info!(user_id = %user.id, symbol = %item.symbol, "watchlist item added");
    Ok((StatusCode::CREATED, Json(item)))
}

// PUT /api/watchlist/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(new): Json<NewWatchlistItem>,
) -> Result<Json<WatchlistItem>> {
    validate(&new)?;
    Ok(Json(watchlist::update_item(&state.db, &user.id, id, &new).await?))
}

// DELETE /api/watchlist/:id
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    deleted(watchlist::remove_item(&state.db, &user.id, id).await?, "Watchlist item")
}
