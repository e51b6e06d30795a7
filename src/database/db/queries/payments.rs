use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, Transaction as DbTransaction};

use super::decimal_col;
use super::subscriptions::{subscription_from_row, SELECT_SUBSCRIPTIONS};
use crate::database::models::{NewPayment, Payment};

#[derive(Debug, Clone, Copy)]
pub enum PaymentTarget {
    Bill(i64),
    Subscription(i64),
}

impl PaymentTarget {
    fn ids(&self) -> (Option<i64>, Option<i64>) {
        match *self {
            PaymentTarget::Bill(id) => (Some(id), None),
            PaymentTarget::Subscription(id) => (None, Some(id)),
        }
    }
}

fn payment_from_row(row: &SqliteRow) -> Result<Payment, sqlx::Error> {
    Ok(Payment {
        id: row.try_get("id")?,
        bill_id: row.try_get("bill_id")?,
        subscription_id: row.try_get("subscription_id")?,
        amount: decimal_col(row, "amount")?,
        paid_at: row.try_get("paid_at")?,
        note: row.try_get("note")?,
    })
}

pub(crate) async fn insert_payment(
    tx: &mut DbTransaction<'_, Sqlite>,
    user_id: &str,
    target: PaymentTarget,
    amount: Decimal,
    paid_at: NaiveDate,
    note: Option<&str>,
) -> Result<Payment, sqlx::Error> {
    let (bill_id, subscription_id) = target.ids();

    let row = sqlx::query(
        r#"
        INSERT INTO payments (user_id, bill_id, subscription_id, amount, paid_at, note)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, bill_id, subscription_id, amount, paid_at, note
        "#,
    )
    .bind(user_id)
    .bind(bill_id)
    .bind(subscription_id)
    .bind(amount.to_string())
    .bind(paid_at)
    .bind(note)
    .fetch_one(&mut **tx)
    .await?;

    payment_from_row(&row)
}

pub async fn list_payments(
    pool: &Pool<Sqlite>,
    user_id: &str,
    target: PaymentTarget,
) -> Result<Vec<Payment>, sqlx::Error> {
    let (bill_id, subscription_id) = target.ids();

    sqlx::query(
        r#"
        SELECT id, bill_id, subscription_id, amount, paid_at, note
        FROM payments
        WHERE user_id = ?
          AND (? IS NULL OR bill_id = ?)
          AND (? IS NULL OR subscription_id = ?)
        ORDER BY paid_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .bind(bill_id)
    .bind(bill_id)
    .bind(subscription_id)
    .bind(subscription_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(payment_from_row)
    .collect()
}

/// Records a subscription payment and moves its next billing date one cycle forward.
pub async fn record_subscription_payment(
    pool: &Pool<Sqlite>,
    user_id: &str,
    subscription_id: i64,
    payment: &NewPayment,
    today: NaiveDate,
) -> Result<Payment, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let sql = format!("{} WHERE id = ? AND user_id = ?", SELECT_SUBSCRIPTIONS);
    let row = sqlx::query(&sql)
        .bind(subscription_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    let subscription = subscription_from_row(&row)?;
    let billing_day: Option<u32> = row.try_get("billing_day")?;

    let amount = payment.amount.unwrap_or(subscription.cost);
    let paid_at = payment.paid_at.unwrap_or(today);
    let next_billing = subscription.next_billing_date.and_then(|d| {
        let anchor = billing_day.unwrap_or_else(|| d.day());
        subscription.billing_cycle.advance(d, anchor)
    });

    let recorded = insert_payment(
        &mut tx,
        user_id,
        PaymentTarget::Subscription(subscription_id),
        amount,
        paid_at,
        payment.note.as_deref(),
    )
    .await?;

    if next_billing.is_some() {
        sqlx::query("UPDATE subscriptions SET next_billing_date = ? WHERE id = ? AND user_id = ?")
            .bind(next_billing)
            .bind(subscription_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(recorded)
}
