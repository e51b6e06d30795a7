use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::{deleted, require_name};
use crate::backend::{AppState, CurrentUser};
use crate::database::db::migrate::recover_missing_table;
use crate::database::db::queries::categories;
use crate::database::models::{Category, NewCategory};
use crate::error::Result;

// GET /api/categories
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<Category>>> {
    let rows = recover_missing_table(&state.db, "categories", || {
        categories::list_categories(&state.db, &user.id)
    })
    .await?;
    Ok(Json(rows))
}

// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    require_name("name", &new.name)?;
    let category = categories::create_category(&state.db, &user.id, &new).await?;
    info!(user_id = %user.id, category_id = category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

// DELETE /api/categories/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    deleted(categories::delete_category(&state.db, &user.id, id).await?, "Category")
}
