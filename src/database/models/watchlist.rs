use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub id: i64,
    pub symbol: String,
    pub name: Option<String>,
    pub target_price: Option<Decimal>,
    pub notes: Option<String>,
    pub added_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWatchlistItem {
    pub symbol: String,
    pub name: Option<String>,
    pub target_price: Option<Decimal>,
    pub notes: Option<String>,
}
