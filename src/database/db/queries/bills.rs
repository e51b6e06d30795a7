use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use super::payments::{insert_payment, PaymentTarget};
use super::{decimal_col, enum_col};
use crate::database::models::{Bill, BillFilter, BillStatus, NewBill, NewPayment, Payment};

const SELECT_BILLS: &str = r#"
    SELECT id, name, category, amount, due_date, recurrence, status, notes, created_at, due_day
    FROM bills
"#;

fn bill_from_row(row: &SqliteRow) -> Result<Bill, sqlx::Error> {
    Ok(Bill {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        amount: decimal_col(row, "amount")?,
        due_date: row.try_get("due_date")?,
        recurrence: enum_col(row, "recurrence")?,
        status: enum_col(row, "status")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn create_bill(
    pool: &Pool<Sqlite>,
    user_id: &str,
    new: &NewBill,
    created_at: NaiveDateTime,
) -> Result<Bill, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO bills (
            user_id, name, category, amount, due_date, recurrence, status, notes, created_at,
            due_day
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, name, category, amount, due_date, recurrence, status, notes, created_at
        "#,
    )
    .bind(user_id)
    .bind(new.name.trim())
    .bind(new.category.as_deref())
    .bind(new.amount.to_string())
    .bind(new.due_date)
    .bind(new.recurrence.as_str())
    .bind(new.status.as_str())
    .bind(new.notes.as_deref())
    .bind(created_at)
    .bind(new.due_date.day())
    .fetch_one(pool)
    .await?;

    bill_from_row(&row)
}

pub async fn get_bill(pool: &Pool<Sqlite>, user_id: &str, bill_id: i64) -> Result<Bill, sqlx::Error> {
    let sql = format!("{} WHERE id = ? AND user_id = ?", SELECT_BILLS);
    let row = sqlx::query(&sql)
        .bind(bill_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    bill_from_row(&row)
}

/// Larger windows are clamped so the cut-off stays a four-digit-year date.
const MAX_UPCOMING_DAYS: u32 = 36_500;

/// Bills ordered by due date. `upcoming_days` keeps unpaid bills due on or before
/// `today + upcoming_days`, which includes overdue ones.
pub async fn list_bills(
    pool: &Pool<Sqlite>,
    user_id: &str,
    filter: &BillFilter,
    today: NaiveDate,
) -> Result<Vec<Bill>, sqlx::Error> {
    let status = filter.status.map(|s| s.as_str());
    let due_before = filter.upcoming_days.map(|days| {
        let days = days.min(MAX_UPCOMING_DAYS);
        today
            .checked_add_days(chrono::Days::new(days.into()))
            .unwrap_or(today)
    });

    let sql = format!(
        r#"{}
        WHERE user_id = ?
          AND (? IS NULL OR status = ?)
          AND (? IS NULL OR (status = 'unpaid' AND due_date <= ?))
        ORDER BY due_date ASC, id ASC
        "#,
        SELECT_BILLS
    );

    sqlx::query(&sql)
        .bind(user_id)
        .bind(status)
        .bind(status)
        .bind(due_before)
        .bind(due_before)
        .fetch_all(pool)
        .await?
        .iter()
        .map(bill_from_row)
        .collect()
}

pub async fn update_bill(
    pool: &Pool<Sqlite>,
    user_id: &str,
    bill_id: i64,
    new: &NewBill,
) -> Result<Bill, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE bills
        SET name = ?, category = ?, amount = ?, due_date = ?, recurrence = ?, status = ?, notes = ?,
            due_day = ?
        WHERE id = ? AND user_id = ?
        RETURNING id, name, category, amount, due_date, recurrence, status, notes, created_at
        "#,
    )
    .bind(new.name.trim())
    .bind(new.category.as_deref())
    .bind(new.amount.to_string())
    .bind(new.due_date)
    .bind(new.recurrence.as_str())
    .bind(new.status.as_str())
    .bind(new.notes.as_deref())
    .bind(new.due_date.day())
    .bind(bill_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    bill_from_row(&row)
}

pub async fn delete_bill(pool: &Pool<Sqlite>, user_id: &str, bill_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM bills WHERE id = ? AND user_id = ?")
        .bind(bill_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[derive(Debug)]
pub enum BillPayment {
    Paid(Bill, Payment),
    /// One-off bill that was settled before, or a racing payment got there first.
    AlreadyPaid,
}

/* Paying a bill is atomic: the payment row is recorded and the bill either
moves to its next due date (recurring) or is marked paid (one-off). The
update only applies to the unpaid row that was read, so a second payment
for the same due date finds nothing to settle. */
pub async fn pay_bill(
    pool: &Pool<Sqlite>,
    user_id: &str,
    bill_id: i64,
    payment: &NewPayment,
    today: NaiveDate,
) -> Result<BillPayment, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let sql = format!("{} WHERE id = ? AND user_id = ?", SELECT_BILLS);
    let row = sqlx::query(&sql)
        .bind(bill_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    let bill = bill_from_row(&row)?;
    if bill.status == BillStatus::Paid {
        return Ok(BillPayment::AlreadyPaid);
    }

    let anchor_day: u32 = row
        .try_get::<Option<u32>, _>("due_day")?
        .unwrap_or_else(|| bill.due_date.day());
    let (next_due, next_status) = match bill.recurrence.advance(bill.due_date, anchor_day) {
        Some(next) => (next, BillStatus::Unpaid),
        None => (bill.due_date, BillStatus::Paid),
    };

    let settled = sqlx::query(
        r#"
        UPDATE bills SET due_date = ?, status = ?
        WHERE id = ? AND user_id = ? AND status = 'unpaid' AND due_date = ?
        "#,
    )
    .bind(next_due)
    .bind(next_status.as_str())
    .bind(bill_id)
    .bind(user_id)
    .bind(bill.due_date)
    .execute(&mut *tx)
    .await?;
    if settled.rows_affected() == 0 {
        return Ok(BillPayment::AlreadyPaid);
    }

    let amount: Decimal = payment.amount.unwrap_or(bill.amount);
    let recorded = insert_payment(
        &mut tx,
        user_id,
        PaymentTarget::Bill(bill_id),
        amount,
        payment.paid_at.unwrap_or(today),
        payment.note.as_deref(),
    )
    .await?;

    let row = sqlx::query(&sql)
        .bind(bill_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    let updated = bill_from_row(&row)?;

    tx.commit().await?;
    Ok(BillPayment::Paid(updated, recorded))
}
