use chrono::{Datelike, NaiveDateTime};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use super::{decimal_col, enum_col};
use crate::database::models::{NewSubscription, Subscription, SubscriptionStatus};

pub(crate) const SELECT_SUBSCRIPTIONS: &str = r#"
    SELECT id, name, category, cost, billing_cycle, status, next_billing_date, notes, created_at,
           billing_day
    FROM subscriptions
"#;

pub(crate) fn subscription_from_row(row: &SqliteRow) -> Result<Subscription, sqlx::Error> {
    Ok(Subscription {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        cost: decimal_col(row, "cost")?,
        billing_cycle: enum_col(row, "billing_cycle")?,
        status: enum_col(row, "status")?,
        next_billing_date: row.try_get("next_billing_date")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn create_subscription(
    pool: &Pool<Sqlite>,
    user_id: &str,
    new: &NewSubscription,
    created_at: NaiveDateTime,
) -> Result<Subscription, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO subscriptions (
            user_id, name, category, cost, billing_cycle, status,
            next_billing_date, notes, created_at, billing_day
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, name, category, cost, billing_cycle, status, next_billing_date, notes, created_at
        "#,
    )
    .bind(user_id)
    .bind(new.name.trim())
    .bind(new.category.trim())
    .bind(new.cost.to_string())
    .bind(new.billing_cycle.as_str())
    .bind(new.status.as_str())
    .bind(new.next_billing_date)
    .bind(new.notes.as_deref())
    .bind(created_at)
    .bind(new.next_billing_date.map(|d| d.day()))
    .fetch_one(pool)
    .await?;

    subscription_from_row(&row)
}

pub async fn get_subscription(
    pool: &Pool<Sqlite>,
    user_id: &str,
    subscription_id: i64,
) -> Result<Subscription, sqlx::Error> {
    let sql = format!("{} WHERE id = ? AND user_id = ?", SELECT_SUBSCRIPTIONS);
    let row = sqlx::query(&sql)
        .bind(subscription_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    subscription_from_row(&row)
}

pub async fn list_subscriptions(
    pool: &Pool<Sqlite>,
    user_id: &str,
    status: Option<SubscriptionStatus>,
) -> Result<Vec<Subscription>, sqlx::Error> {
    let sql = format!(
        "{} WHERE user_id = ? AND (? IS NULL OR status = ?) ORDER BY name ASC, id ASC",
        SELECT_SUBSCRIPTIONS
    );
    let status = status.map(|s| s.as_str());

    sqlx::query(&sql)
        .bind(user_id)
        .bind(status)
        .bind(status)
        .fetch_all(pool)
        .await?
        .iter()
        .map(subscription_from_row)
        .collect()
}

pub async fn update_subscription(
    pool: &Pool<Sqlite>,
    user_id: &str,
    subscription_id: i64,
    new: &NewSubscription,
) -> Result<Subscription, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE subscriptions
        SET name = ?, category = ?, cost = ?, billing_cycle = ?, status = ?,
            next_billing_date = ?, notes = ?, billing_day = ?
        WHERE id = ? AND user_id = ?
        RETURNING id, name, category, cost, billing_cycle, status, next_billing_date, notes, created_at
        "#,
    )
    .bind(new.name.trim())
    .bind(new.category.trim())
    .bind(new.cost.to_string())
    .bind(new.billing_cycle.as_str())
    .bind(new.status.as_str())
    .bind(new.next_billing_date)
    .bind(new.notes.as_deref())
    .bind(new.next_billing_date.map(|d| d.day()))
    .bind(subscription_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    subscription_from_row(&row)
}

pub async fn delete_subscription(
    pool: &Pool<Sqlite>,
    user_id: &str,
    subscription_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE id = ? AND user_id = ?")
        .bind(subscription_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
