use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use super::decimal_col;
use crate::database::models::{NewTransaction, Transaction, TransactionFilter, MAX_PAGE_SIZE};

const SELECT_TRANSACTIONS: &str = r#"
    SELECT
        t.id, t.category_id, c.name AS category_name, t.amount, t.is_expense,
        t.description, t.transacted_at, t.created_at
    FROM transactions t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction, sqlx::Error> {
    Ok(Transaction {
        id: row.try_get("id")?,
        category_id: row.try_get("category_id")?,
        category_name: row.try_get("category_name")?,
        amount: decimal_col(row, "amount")?,
        is_expense: row.try_get("is_expense")?,
        description: row.try_get("description")?,
        transacted_at: row.try_get("transacted_at")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn create_transaction(
    pool: &Pool<Sqlite>,
    user_id: &str,
    new: &NewTransaction,
    created_at: NaiveDateTime,
) -> Result<Transaction, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO transactions (
            user_id, category_id, amount, is_expense, description, transacted_at, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(new.category_id)
    .bind(new.amount.to_string())
    .bind(new.is_expense)
    .bind(new.description.as_deref())
    .bind(new.transacted_at)
    .bind(created_at)
    .fetch_one(pool)
    .await?;

    get_transaction(pool, user_id, id).await
}

pub async fn get_transaction(
    pool: &Pool<Sqlite>,
    user_id: &str,
    transaction_id: i64,
) -> Result<Transaction, sqlx::Error> {
    let sql = format!("{} WHERE t.id = ? AND t.user_id = ?", SELECT_TRANSACTIONS);
    let row = sqlx::query(&sql)
        .bind(transaction_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    transaction_from_row(&row)
}

pub async fn list_transactions(
    pool: &Pool<Sqlite>,
    user_id: &str,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let sql = format!(
        r#"{}
        WHERE t.user_id = ?
          AND (? IS NULL OR t.transacted_at >= ?)
          AND (? IS NULL OR t.transacted_at <= ?)
          AND (? IS NULL OR t.category_id = ?)
        ORDER BY t.transacted_at DESC, t.id DESC
        LIMIT ? OFFSET COALESCE(?, 0)
        "#,
        SELECT_TRANSACTIONS
    );

    sqlx::query(&sql)
        .bind(user_id)
        .bind(filter.from)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.to)
        .bind(filter.category_id)
        .bind(filter.category_id)
        .bind(filter.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE))
        .bind(filter.offset)
        .fetch_all(pool)
        .await?
        .iter()
        .map(transaction_from_row)
        .collect()
}

/// Every transaction in `[from, to]`, oldest first, without paging.
pub async fn list_between(
    pool: &Pool<Sqlite>,
    user_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let sql = format!(
        r#"{}
        WHERE t.user_id = ? AND t.transacted_at >= ? AND t.transacted_at <= ?
        ORDER BY t.transacted_at ASC, t.id ASC
        "#,
        SELECT_TRANSACTIONS
    );

    sqlx::query(&sql)
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?
        .iter()
        .map(transaction_from_row)
        .collect()
}

pub async fn delete_transaction(
    pool: &Pool<Sqlite>,
    user_id: &str,
    transaction_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
        .bind(transaction_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
