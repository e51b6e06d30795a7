//! Budget recommendations from spending history.
//!
//! History is grouped per category into a monthly average and a frequency,
//! each group gets a confidence score, and the income is then split using
//! one of the [`BudgetMethod`] policies.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::database::models::{BudgetMethod, Transaction};
use crate::util::{months_spanned, round_money};

const NEED_KEYWORDS: &[&str] = &[
    "rent", "mortgage", "utilit", "electric", "water", "gas", "grocer", "insurance", "health",
    "medical", "pharmac", "transport", "fuel", "car", "loan", "debt", "childcare", "phone",
    "internet",
];

/// Share of transactions that must land near the modal day-of-month.
const RECURRING_SHARE_PCT: usize = 60;
const RECURRING_DAY_TOLERANCE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Need,
    Want,
}

pub fn classify(category_name: &str) -> Classification {
    let lower = category_name.to_lowercase();
    if NEED_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Classification::Need
    } else {
        Classification::Want
    }
}

/// One expense, reduced to what the heuristic needs.
#[derive(Debug, Clone)]
pub struct SpendingRecord {
    pub category_id: Option<i64>,
    pub category_name: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl SpendingRecord {
    /// Expense transactions only; income is not spending.
    pub fn from_transactions(transactions: &[Transaction]) -> Vec<SpendingRecord> {
        transactions
            .iter()
            .filter(|t| t.is_expense)
            .map(|t| SpendingRecord {
                category_id: t.category_id,
                category_name: t
                    .category_name
                    .clone()
                    .unwrap_or_else(|| "Uncategorized".to_string()),
                amount: t.amount,
                date: t.transacted_at,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAnalysis {
    pub category_id: Option<i64>,
    pub category_name: String,
    pub classification: Classification,
    pub total: Decimal,
    pub transaction_count: usize,
    pub months: u32,
    pub monthly_average: Decimal,
    /// Transactions per month.
    pub frequency: Decimal,
    pub recurring_day: Option<u32>,
    pub confidence: Decimal,
}

pub fn analyze_spending(history: &[SpendingRecord], as_of: NaiveDate) -> Vec<CategoryAnalysis> {
    let mut groups: BTreeMap<Option<i64>, Vec<&SpendingRecord>> = BTreeMap::new();
    for record in history {
        groups.entry(record.category_id).or_default().push(record);
    }

    groups
        .into_iter()
        .filter_map(|(category_id, records)| {
            let first = records.first()?;
            let earliest = records.iter().map(|r| r.date).min()?;
            let months = months_spanned(earliest, as_of);
            let total: Decimal = records.iter().map(|r| r.amount).sum();
            let count = records.len();

            let monthly_average = round_money(total / Decimal::from(months));
            let frequency = (Decimal::from(count as u64) / Decimal::from(months)).round_dp(2);

            let days: Vec<u32> = records.iter().map(|r| r.date.day()).collect();
            let recurring_day = detect_recurring_day(&days);

            Some(CategoryAnalysis {
                category_id,
                category_name: first.category_name.clone(),
                classification: classify(&first.category_name),
                total,
                transaction_count: count,
                months,
                monthly_average,
                frequency,
                recurring_day,
                confidence: confidence_score(recurring_day.is_some(), frequency),
            })
        })
        .collect()
}

/// Most common day-of-month, if enough of the transactions cluster around it.
fn detect_recurring_day(days: &[u32]) -> Option<u32> {
    if days.len() < 2 {
        return None;
    }

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for day in days {
        *counts.entry(*day).or_default() += 1;
    }

    let mut mode = 0;
    let mut best = 0;
    for (day, count) in counts {
        if count > best {
            mode = day;
            best = count;
        }
    }

    let near = days
        .iter()
        .filter(|d| d.abs_diff(mode) <= RECURRING_DAY_TOLERANCE)
        .count();

    if near * 100 >= days.len() * RECURRING_SHARE_PCT {
        Some(mode)
    } else {
        None
    }
}

fn confidence_score(recurring: bool, frequency: Decimal) -> Decimal {
    let mut score = Decimal::new(5, 1);
    if recurring {
        score += Decimal::new(3, 1);
    }
    if frequency >= Decimal::new(8, 1) && frequency <= Decimal::new(12, 1) {
        score += Decimal::new(2, 1);
    }
    score.min(Decimal::ONE)
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRecommendation {
    pub category_id: Option<i64>,
    pub category_name: String,
    pub classification: Classification,
    pub monthly_average: Decimal,
    pub frequency: Decimal,
    pub confidence: Decimal,
    pub recommended_amount: Decimal,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetRecommendation {
    pub method: BudgetMethod,
    pub income: Decimal,
    pub total_allocated: Decimal,
    /// Income minus allocations. Negative when history outruns income.
    pub unallocated: Decimal,
    /// Explicit savings line for methods that reserve one.
    pub savings_target: Option<Decimal>,
    pub categories: Vec<CategoryRecommendation>,
}

pub fn recommend(
    analysis: &[CategoryAnalysis],
    income: Decimal,
    method: BudgetMethod,
) -> BudgetRecommendation {
    let (mut categories, savings_target) = match method {
        BudgetMethod::Traditional => (traditional(analysis), None),
        BudgetMethod::ZeroBased => (zero_based(analysis, income), None),
        BudgetMethod::FiftyThirtyTwenty => (
            fifty_thirty_twenty(analysis, income),
            Some(round_money(income * Decimal::new(20, 2))),
        ),
        BudgetMethod::Envelope => (envelope(analysis), None),
    };

    categories.sort_by(|a, b| {
        b.recommended_amount
            .cmp(&a.recommended_amount)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });

    let total_allocated: Decimal = categories.iter().map(|c| c.recommended_amount).sum();

    BudgetRecommendation {
        method,
        income,
        total_allocated,
        unallocated: income - total_allocated,
        savings_target,
        categories,
    }
}

fn line(a: &CategoryAnalysis, amount: Decimal, reason: impl Into<String>) -> CategoryRecommendation {
    CategoryRecommendation {
        category_id: a.category_id,
        category_name: a.category_name.clone(),
        classification: a.classification,
        monthly_average: a.monthly_average,
        frequency: a.frequency,
        confidence: a.confidence,
        recommended_amount: amount,
        reason: reason.into(),
    }
}

fn traditional(analysis: &[CategoryAnalysis]) -> Vec<CategoryRecommendation> {
    analysis
        .iter()
        .map(|a| {
            line(
                a,
                round_money(a.monthly_average * Decimal::new(95, 2)),
                "Average monthly spending reduced by 5%",
            )
        })
        .collect()
}

fn zero_based(analysis: &[CategoryAnalysis], income: Decimal) -> Vec<CategoryRecommendation> {
    let mut ordered: Vec<&CategoryAnalysis> = analysis.iter().collect();
    ordered.sort_by(|a, b| {
        a.classification
            .cmp(&b.classification)
            .then_with(|| b.confidence.cmp(&a.confidence))
            .then_with(|| b.monthly_average.cmp(&a.monthly_average))
            .then_with(|| a.category_name.cmp(&b.category_name))
    });

    let mut remaining = income.max(Decimal::ZERO);
    ordered
        .into_iter()
        .map(|a| {
            let amount = a.monthly_average.min(remaining);
            remaining -= amount;
            let reason = if amount == a.monthly_average {
                "Funded at average monthly spending"
            } else {
                "Partially funded: income exhausted"
            };
            line(a, amount, reason)
        })
        .collect()
}

fn fifty_thirty_twenty(analysis: &[CategoryAnalysis], income: Decimal) -> Vec<CategoryRecommendation> {
    let income = income.max(Decimal::ZERO);
    let needs_pool = income * Decimal::new(50, 2);
    let wants_pool = income * Decimal::new(30, 2);

    let mut out = fill_pool(analysis, Classification::Need, needs_pool, "needs (50%)");
    out.extend(fill_pool(analysis, Classification::Want, wants_pool, "wants (30%)"));
    out
}

/// Averages of one class, scaled down together when they overflow the pool.
/// Scaled amounts truncate to cents so the pool is never exceeded.
fn fill_pool(
    analysis: &[CategoryAnalysis],
    class: Classification,
    pool: Decimal,
    label: &str,
) -> Vec<CategoryRecommendation> {
    let members: Vec<&CategoryAnalysis> =
        analysis.iter().filter(|a| a.classification == class).collect();
    let demand: Decimal = members.iter().map(|a| a.monthly_average).sum();

    if demand <= pool {
        return members
            .into_iter()
            .map(|a| line(a, a.monthly_average, format!("Fits within the {} pool", label)))
            .collect();
    }

    members
        .into_iter()
        .map(|a| {
            let share = (a.monthly_average * pool / demand)
                .round_dp_with_strategy(2, RoundingStrategy::ToZero);
            line(a, share, format!("Scaled to fit the {} pool", label))
        })
        .collect()
}

fn envelope(analysis: &[CategoryAnalysis]) -> Vec<CategoryRecommendation> {
    analysis
        .iter()
        .map(|a| match a.classification {
            Classification::Need => line(a, a.monthly_average, "Essential envelope at average spending"),
            Classification::Want => line(
                a,
                round_money(a.monthly_average * Decimal::new(85, 2)),
                "Discretionary envelope trimmed by 15%",
            ),
        })
        .collect()
}
