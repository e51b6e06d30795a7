use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Allocation policy used to build (or recommend) a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetMethod {
    Traditional,
    ZeroBased,
    FiftyThirtyTwenty,
    Envelope,
}

impl Default for BudgetMethod {
    fn default() -> Self {
        BudgetMethod::Traditional
    }
}

impl BudgetMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traditional => "traditional",
            Self::ZeroBased => "zero_based",
            Self::FiftyThirtyTwenty => "fifty_thirty_twenty",
            Self::Envelope => "envelope",
        }
    }
}

impl FromStr for BudgetMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "traditional" => Ok(Self::Traditional),
            "zero_based" | "zero-based" => Ok(Self::ZeroBased),
            "fifty_thirty_twenty" | "50/30/20" | "50-30-20" => Ok(Self::FiftyThirtyTwenty),
            "envelope" => Ok(Self::Envelope),
            other => Err(format!("Unknown budget method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub name: String,
    pub method: BudgetMethod,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub income: Decimal,
    pub total_amount: Decimal,
    pub created_at: NaiveDateTime,
    pub categories: Vec<BudgetCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub allocated_amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBudget {
    pub name: String,
    #[serde(default)]
    pub method: BudgetMethod,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub income: Decimal,
    #[serde(default)]
    pub categories: Vec<NewBudgetCategory>,
}

impl NewBudget {
    pub fn total_allocated(&self) -> Decimal {
        self.categories.iter().map(|c| c.allocated_amount).sum()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBudgetCategory {
    pub category_id: i64,
    pub allocated_amount: Decimal,
}
