use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, Transaction as DbTransaction};

use super::{decimal_col, enum_col};
use crate::database::models::{Budget, BudgetCategory, NewBudget};

/*
A budget and its category lines are always written together inside one
database transaction.
 */

fn budget_from_row(row: &SqliteRow) -> Result<Budget, sqlx::Error> {
    Ok(Budget {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        method: enum_col(row, "method")?,
        period_start: row.try_get("period_start")?,
        period_end: row.try_get("period_end")?,
        income: decimal_col(row, "income")?,
        total_amount: decimal_col(row, "total_amount")?,
        created_at: row.try_get("created_at")?,
        categories: Vec::new(),
    })
}

fn budget_category_from_row(row: &SqliteRow) -> Result<BudgetCategory, sqlx::Error> {
    Ok(BudgetCategory {
        id: row.try_get("id")?,
        category_id: row.try_get("category_id")?,
        category_name: row.try_get("category_name")?,
        allocated_amount: decimal_col(row, "allocated_amount")?,
    })
}

async fn insert_lines(
    tx: &mut DbTransaction<'_, Sqlite>,
    user_id: &str,
    budget_id: i64,
    new: &NewBudget,
) -> Result<(), sqlx::Error> {
    for line in &new.categories {
        // The category must belong to the same user.
        let owned: Option<i64> =
            sqlx::query_scalar("SELECT id FROM categories WHERE id = ? AND user_id = ?")
                .bind(line.category_id)
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;
        if owned.is_none() {
            return Err(sqlx::Error::RowNotFound);
        }

        sqlx::query(
            r#"
            INSERT INTO budget_categories (budget_id, category_id, allocated_amount)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(budget_id)
        .bind(line.category_id)
        .bind(line.allocated_amount.to_string())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn create_budget(
    pool: &Pool<Sqlite>,
    user_id: &str,
    new: &NewBudget,
    created_at: NaiveDateTime,
) -> Result<Budget, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let budget_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO budgets (
            user_id, name, method, period_start, period_end, income, total_amount, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(new.name.trim())
    .bind(new.method.as_str())
    .bind(new.period_start)
    .bind(new.period_end)
    .bind(new.income.to_string())
    .bind(new.total_allocated().to_string())
    .bind(created_at)
    .fetch_one(&mut *tx)
    .await?;

    insert_lines(&mut tx, user_id, budget_id, new).await?;

    tx.commit().await?;

    get_budget(pool, user_id, budget_id).await
}

async fn load_lines(pool: &Pool<Sqlite>, budget_id: i64) -> Result<Vec<BudgetCategory>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT bc.id, bc.category_id, c.name AS category_name, bc.allocated_amount
        FROM budget_categories bc
        JOIN categories c ON c.id = bc.category_id
        WHERE bc.budget_id = ?
        ORDER BY c.name ASC
        "#,
    )
    .bind(budget_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(budget_category_from_row)
    .collect()
}

pub async fn get_budget(
    pool: &Pool<Sqlite>,
    user_id: &str,
    budget_id: i64,
) -> Result<Budget, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, name, method, period_start, period_end, income, total_amount, created_at
        FROM budgets
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(budget_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let mut budget = budget_from_row(&row)?;
    budget.categories = load_lines(pool, budget.id).await?;
    Ok(budget)
}

pub async fn list_budgets(pool: &Pool<Sqlite>, user_id: &str) -> Result<Vec<Budget>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, method, period_start, period_end, income, total_amount, created_at
        FROM budgets
        WHERE user_id = ?
        ORDER BY period_start DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut budgets = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut budget = budget_from_row(row)?;
        budget.categories = load_lines(pool, budget.id).await?;
        budgets.push(budget);
    }
    Ok(budgets)
}

/// Budgets whose period contains `date`.
pub async fn count_active_budgets(
    pool: &Pool<Sqlite>,
    user_id: &str,
    date: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM budgets WHERE user_id = ? AND period_start <= ? AND period_end >= ?",
    )
    .bind(user_id)
    .bind(date)
    .bind(date)
    .fetch_one(pool)
    .await
}

/// Replaces the budget row and all of its category lines.
pub async fn update_budget(
    pool: &Pool<Sqlite>,
    user_id: &str,
    budget_id: i64,
    new: &NewBudget,
) -> Result<Budget, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE budgets
        SET name = ?, method = ?, period_start = ?, period_end = ?, income = ?, total_amount = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(new.name.trim())
    .bind(new.method.as_str())
    .bind(new.period_start)
    .bind(new.period_end)
    .bind(new.income.to_string())
    .bind(new.total_allocated().to_string())
    .bind(budget_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    sqlx::query("DELETE FROM budget_categories WHERE budget_id = ?")
        .bind(budget_id)
        .execute(&mut *tx)
        .await?;

    insert_lines(&mut tx, user_id, budget_id, new).await?;

    tx.commit().await?;

    get_budget(pool, user_id, budget_id).await
}

pub async fn delete_budget(
    pool: &Pool<Sqlite>,
    user_id: &str,
    budget_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM budgets WHERE id = ? AND user_id = ?")
        .bind(budget_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
