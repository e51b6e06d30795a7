use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::util::add_months_anchored;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Cost of one cycle expressed per month.
    pub fn monthly_equivalent(&self, cost: Decimal) -> Decimal {
        match self {
            Self::Weekly => cost * Decimal::from(52) / Decimal::from(12),
            Self::Monthly => cost,
            Self::Quarterly => cost / Decimal::from(3),
            Self::Yearly => cost / Decimal::from(12),
        }
    }

    /// Next billing date one cycle after `date`, kept on `anchor_day` for
    /// month-based cycles.
    pub fn advance(&self, date: NaiveDate, anchor_day: u32) -> Option<NaiveDate> {
        match self {
            Self::Weekly => date.checked_add_days(Days::new(7)),
            Self::Monthly => add_months_anchored(date, 1, anchor_day),
            Self::Quarterly => add_months_anchored(date, 3, anchor_day),
            Self::Yearly => add_months_anchored(date, 12, anchor_day),
        }
    }
}

impl FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" | "annual" | "annually" => Ok(Self::Yearly),
            other => Err(format!("Unknown billing cycle: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::Active
    }
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown subscription status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub cost: Decimal,
    pub billing_cycle: BillingCycle,
    pub status: SubscriptionStatus,
    pub next_billing_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Subscription {
    pub fn monthly_cost(&self) -> Decimal {
        self.billing_cycle.monthly_equivalent(self.cost)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
    pub name: String,
    pub category: String,
    pub cost: Decimal,
    pub billing_cycle: BillingCycle,
    #[serde(default)]
    pub status: SubscriptionStatus,
    pub next_billing_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cycles_convert_to_monthly_cost() {
        assert_eq!(BillingCycle::Weekly.monthly_equivalent(Decimal::from(12)), Decimal::from(52));
        assert_eq!(BillingCycle::Quarterly.monthly_equivalent(Decimal::from(30)), Decimal::from(10));
        assert_eq!(BillingCycle::Yearly.monthly_equivalent(Decimal::from(120)), Decimal::from(10));
    }

    #[test]
    fn billing_dates_return_to_the_anchor_day() {
        let mut next = date(2024, 1, 30);
        for expected in [date(2024, 2, 29), date(2024, 3, 30), date(2024, 4, 30)] {
            next = BillingCycle::Monthly.advance(next, 30).unwrap();
            assert_eq!(next, expected);
        }
        assert_eq!(BillingCycle::Quarterly.advance(date(2024, 2, 29), 31), Some(date(2024, 5, 31)));
        assert_eq!(BillingCycle::Weekly.advance(date(2024, 2, 26), 26), Some(date(2024, 3, 4)));
    }
}
