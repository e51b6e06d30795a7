use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A money movement. `amount` is always positive; `is_expense` carries the sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub amount: Decimal,
    pub is_expense: bool,
    pub description: Option<String>,
    pub transacted_at: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub is_expense: bool,
    pub description: Option<String>,
    pub transacted_at: NaiveDate,
}

/// Rows returned by one transaction listing when no smaller `limit` is given.
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
