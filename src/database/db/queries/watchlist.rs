use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use super::opt_decimal_col;
use crate::database::models::{NewWatchlistItem, WatchlistItem};

fn item_from_row(row: &SqliteRow) -> Result<WatchlistItem, sqlx::Error> {
    Ok(WatchlistItem {
        id: row.try_get("id")?,
        symbol: row.try_get("symbol")?,
        name: row.try_get("name")?,
        target_price: opt_decimal_col(row, "target_price")?,
        notes: row.try_get("notes")?,
        added_at: row.try_get("added_at")?,
    })
}

pub async fn add_item(
    pool: &Pool<Sqlite>,
    user_id: &str,
    new: &NewWatchlistItem,
    added_at: NaiveDateTime,
) -> Result<WatchlistItem, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO watchlist (user_id, symbol, name, target_price, notes, added_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, symbol, name, target_price, notes, added_at
        "#,
    )
    .bind(user_id)
    .bind(new.symbol.trim().to_uppercase())
    .bind(new.name.as_deref())
    .bind(new.target_price.map(|p| p.to_string()))
    .bind(new.notes.as_deref())
    .bind(added_at)
    .fetch_one(pool)
    .await?;

    item_from_row(&row)
}

pub async fn list_items(pool: &Pool<Sqlite>, user_id: &str) -> Result<Vec<WatchlistItem>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, symbol, name, target_price, notes, added_at
        FROM watchlist
        WHERE user_id = ?
        ORDER BY symbol ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(item_from_row)
    .collect()
}

pub async fn update_item(
    pool: &Pool<Sqlite>,
    user_id: &str,
    item_id: i64,
    new: &NewWatchlistItem,
) -> Result<WatchlistItem, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE watchlist
        SET symbol = ?, name = ?, target_price = ?, notes = ?
        WHERE id = ? AND user_id = ?
        RETURNING id, symbol, name, target_price, notes, added_at
        "#,
    )
    .bind(new.symbol.trim().to_uppercase())
    .bind(new.name.as_deref())
    .bind(new.target_price.map(|p| p.to_string()))
    .bind(new.notes.as_deref())
    .bind(item_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    item_from_row(&row)
}

pub async fn remove_item(pool: &Pool<Sqlite>, user_id: &str, item_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM watchlist WHERE id = ? AND user_id = ?")
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
