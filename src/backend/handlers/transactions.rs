use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::{deleted, require_positive};
use crate::backend::{AppState, CurrentUser};
use crate::database::db::migrate::recover_missing_table;
use crate::database::db::queries::{categories, transactions};
use crate::database::models::{NewTransaction, Transaction, TransactionFilter, MAX_PAGE_SIZE};
use crate::error::{AppError, Result};
use crate::util::now;

fn validate_paging(filter: &TransactionFilter) -> Result<()> {
    if let Some(limit) = filter.limit {
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
    }
    if filter.offset.is_some_and(|offset| offset < 0) {
        return Err(AppError::validation("offset must not be negative"));
    }
    Ok(())
}

// GET /api/transactions?from=&to=&category_id=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>> {
    validate_paging(&filter)?;
    let rows = recover_missing_table(&state.db, "transactions", || {
        transactions::list_transactions(&state.db, &user.id, &filter)
    })
    .await?;
    Ok(Json(rows))
}

// POST /api/transactions
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>)> {
    require_positive("amount", new.amount)?;
    if let Some(category_id) = new.category_id {
        // 404 rather than leaking another user's category through the FK
        categories::get_category(&state.db, &user.id, category_id).await?;
    }

    let transaction = transactions::create_transaction(&state.db, &user.id, &new, now()).await?;
    info!(user_id = %user.id, transaction_id = transaction.id, "transaction recorded");
    Ok((StatusCode::CREATED, Json(transaction)))
}

// GET /api/transactions/:id
pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>> {
    Ok(Json(transactions::get_transaction(&state.db, &user.id, id).await?))
}

// DELETE /api/transactions/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    deleted(transactions::delete_transaction(&state.db, &user.id, id).await?, "Transaction")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paging(limit: Option<i64>, offset: Option<i64>) -> TransactionFilter {
        TransactionFilter {
            limit,
            offset,
            ..TransactionFilter::default()
        }
    }

    #[test]
    fn paging_stays_within_the_page_cap() {
        assert!(validate_paging(&paging(None, None)).is_ok());
        assert!(validate_paging(&paging(Some(1), Some(0))).is_ok());
        assert!(validate_paging(&paging(Some(MAX_PAGE_SIZE), None)).is_ok());
        assert!(validate_paging(&paging(Some(0), None)).is_err());
        assert!(validate_paging(&paging(Some(-1), None)).is_err());
        assert!(validate_paging(&paging(Some(MAX_PAGE_SIZE + 1), None)).is_err());
        assert!(validate_paging(&paging(None, Some(-5))).is_err());
    }
}
