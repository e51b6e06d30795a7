use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub bill_id: Option<i64>,
    pub subscription_id: Option<i64>,
    pub amount: Decimal,
    pub paid_at: NaiveDate,
    pub note: Option<String>,
}

/// Body of a payment request. Missing fields default to the parent's amount and today.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPayment {
    pub amount: Option<Decimal>,
    pub paid_at: Option<NaiveDate>,
    pub note: Option<String>,
}
