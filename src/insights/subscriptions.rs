//! Duplicate detection and cost summary over a user's subscriptions.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{BillingCycle, Subscription, SubscriptionStatus};
use crate::util::round_money;

pub const RENEWAL_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateMember {
    pub id: i64,
    pub name: String,
    pub cost: Decimal,
    pub billing_cycle: BillingCycle,
    pub monthly_cost: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub category: String,
    /// Most expensive first; that one is assumed to be kept.
    pub subscriptions: Vec<DuplicateMember>,
    pub total_monthly_cost: Decimal,
    pub potential_monthly_savings: Decimal,
}

fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Active subscriptions sharing a category. Groups of one are never reported.
pub fn find_duplicates(subscriptions: &[Subscription]) -> Vec<DuplicateGroup> {
    let mut groups: BTreeMap<String, Vec<&Subscription>> = BTreeMap::new();
    for sub in subscriptions
        .iter()
        .filter(|s| s.status == SubscriptionStatus::Active)
    {
        groups.entry(normalize_category(&sub.category)).or_default().push(sub);
    }

    let mut out: Vec<DuplicateGroup> = groups
        .into_values()
        .filter(|members| members.len() >= 2)
        .map(|members| {
            let mut members: Vec<(Decimal, &Subscription)> =
                members.into_iter().map(|s| (s.monthly_cost(), s)).collect();
            members.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));

            let total: Decimal = members.iter().map(|(m, _)| *m).sum();
            let most_expensive = members[0].0;

            DuplicateGroup {
                category: members[0].1.category.trim().to_string(),
                total_monthly_cost: round_money(total),
                potential_monthly_savings: round_money(total - most_expensive),
                subscriptions: members
                    .into_iter()
                    .map(|(monthly, s)| DuplicateMember {
                        id: s.id,
                        name: s.name.clone(),
                        cost: s.cost,
                        billing_cycle: s.billing_cycle,
                        monthly_cost: round_money(monthly),
                    })
                    .collect(),
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.potential_monthly_savings
            .cmp(&a.potential_monthly_savings)
            .then_with(|| a.category.cmp(&b.category))
    });
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingRenewal {
    pub id: i64,
    pub name: String,
    pub cost: Decimal,
    pub next_billing_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionSummary {
    pub active_count: usize,
    pub paused_count: usize,
    pub cancelled_count: usize,
    pub monthly_total: Decimal,
    pub yearly_total: Decimal,
    pub upcoming_renewals: Vec<UpcomingRenewal>,
}

pub fn summarize(subscriptions: &[Subscription], today: NaiveDate) -> SubscriptionSummary {
    let count = |status: SubscriptionStatus| subscriptions.iter().filter(|s| s.status == status).count();
    let active: Vec<&Subscription> = subscriptions
        .iter()
        .filter(|s| s.status == SubscriptionStatus::Active)
        .collect();

    let monthly: Decimal = active.iter().map(|s| s.monthly_cost()).sum();
    let horizon = today
        .checked_add_days(Days::new(RENEWAL_WINDOW_DAYS))
        .unwrap_or(today);

    let mut upcoming_renewals: Vec<UpcomingRenewal> = active
        .iter()
        .filter_map(|s| {
            let next = s.next_billing_date?;
            (next >= today && next <= horizon).then(|| UpcomingRenewal {
                id: s.id,
                name: s.name.clone(),
                cost: s.cost,
                next_billing_date: next,
            })
        })
        .collect();
    upcoming_renewals.sort_by_key(|r| r.next_billing_date);

    SubscriptionSummary {
        active_count: active.len(),
        paused_count: count(SubscriptionStatus::Paused),
        cancelled_count: count(SubscriptionStatus::Cancelled),
        monthly_total: round_money(monthly),
        yearly_total: round_money(monthly * Decimal::from(12)),
        upcoming_renewals,
    }
}
