/*
SQL queries for every table, one file per entity.
Every function takes the owning user id and filters on it.
 */

pub mod bills;
pub mod budgets;
pub mod categories;
pub mod investments;
pub mod payments;
pub mod subscriptions;
pub mod transactions;
pub mod users;
pub mod watchlist;

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

// Money is stored as TEXT; parse it back into Decimal.
pub(crate) fn decimal_col(row: &SqliteRow, col: &str) -> Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(col)?;
    Decimal::from_str(&text)
        .map_err(|e| sqlx::Error::Decode(format!("Invalid Decimal format for {}: {}", col, e).into()))
}

pub(crate) fn opt_decimal_col(row: &SqliteRow, col: &str) -> Result<Option<Decimal>, sqlx::Error> {
    let text: Option<String> = row.try_get(col)?;
    text.map(|t| {
        Decimal::from_str(&t).map_err(|e| {
            sqlx::Error::Decode(format!("Invalid Decimal format for {}: {}", col, e).into())
        })
    })
    .transpose()
}

pub(crate) fn enum_col<T>(row: &SqliteRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = String>,
{
    let text: String = row.try_get(col)?;
    T::from_str(&text).map_err(|e| sqlx::Error::Decode(e.into()))
}
