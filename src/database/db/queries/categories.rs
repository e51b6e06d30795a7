use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use super::enum_col;
use crate::database::models::{Category, NewCategory};

fn category_from_row(row: &SqliteRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind: enum_col(row, "kind")?,
        color: row.try_get("color")?,
    })
}

pub async fn create_category(
    pool: &Pool<Sqlite>,
    user_id: &str,
    new: &NewCategory,
) -> Result<Category, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO categories (user_id, name, kind, color)
        VALUES (?, ?, ?, ?)
        RETURNING id, name, kind, color
        "#,
    )
    .bind(user_id)
    .bind(new.name.trim())
    .bind(new.kind.as_str())
    .bind(new.color.as_deref())
    .fetch_one(pool)
    .await?;

    category_from_row(&row)
}

pub async fn get_category(
    pool: &Pool<Sqlite>,
    user_id: &str,
    category_id: i64,
) -> Result<Category, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, name, kind, color FROM categories WHERE id = ? AND user_id = ?",
    )
    .bind(category_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    category_from_row(&row)
}

pub async fn list_categories(
    pool: &Pool<Sqlite>,
    user_id: &str,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, name, kind, color
        FROM categories
        WHERE user_id = ?
        ORDER BY name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(category_from_row)
    .collect()
}

pub async fn delete_category(
    pool: &Pool<Sqlite>,
    user_id: &str,
    category_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
        .bind(category_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
