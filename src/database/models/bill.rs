use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::util::add_months_anchored;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    None,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence::None
    }
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Next due date after `date`, `None` for one-off bills. Monthly steps
    /// land on `anchor_day` when the month is long enough.
    pub fn advance(&self, date: NaiveDate, anchor_day: u32) -> Option<NaiveDate> {
        match self {
            Self::None => None,
            Self::Weekly => date.checked_add_days(Days::new(7)),
            Self::Monthly => add_months_anchored(date, 1, anchor_day),
            Self::Quarterly => add_months_anchored(date, 3, anchor_day),
            Self::Yearly => add_months_anchored(date, 12, anchor_day),
        }
    }
}

impl FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "once" => Ok(Self::None),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!("Unknown recurrence: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Unpaid,
    Paid,
}

impl Default for BillStatus {
    fn default() -> Self {
        BillStatus::Unpaid
    }
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            other => Err(format!("Unknown bill status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub recurrence: Recurrence,
    pub status: BillStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Bill {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == BillStatus::Unpaid && self.due_date < today
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBill {
    pub name: String,
    pub category: Option<String>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub status: BillStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillFilter {
    pub status: Option<BillStatus>,
    /// Only unpaid bills due within this many days (overdue ones included).
    pub upcoming_days: Option<u32>,
}
