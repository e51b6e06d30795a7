use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{Bill, Budget, Holding, Subscription, Transaction};
use crate::insights::rebalancing::portfolio_summary;
use crate::insights::subscriptions::summarize;
use crate::util::round_money;

const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Serialize)]
pub struct MonthSummary {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    /// Percent of all expenses in the range.
    pub share: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
    pub months: Vec<MonthSummary>,
    pub expenses_by_category: Vec<CategoryTotal>,
}

/// Income, expenses and net per calendar month plus expense totals per category.
/// Transactions outside `[from, to]` are ignored.
pub fn monthly_report(transactions: &[Transaction], from: NaiveDate, to: NaiveDate) -> MonthlyReport {
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    let mut categories: BTreeMap<String, Decimal> = BTreeMap::new();

    for t in transactions
        .iter()
        .filter(|t| t.transacted_at >= from && t.transacted_at <= to)
    {
        let month = t.transacted_at.format("%Y-%m").to_string();
        let entry = months.entry(month).or_insert((Decimal::ZERO, Decimal::ZERO));
        if t.is_expense {
            entry.1 += t.amount;
            let name = t.category_name.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());
            *categories.entry(name).or_insert(Decimal::ZERO) += t.amount;
        } else {
            entry.0 += t.amount;
        }
    }

    let total_income: Decimal = months.values().map(|(i, _)| *i).sum();
    let total_expenses: Decimal = months.values().map(|(_, e)| *e).sum();

    let mut expenses_by_category: Vec<CategoryTotal> = categories
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            share: if total_expenses.is_zero() {
                Decimal::ZERO
            } else {
                (total / total_expenses * Decimal::ONE_HUNDRED).round_dp(2)
            },
            category,
            total,
        })
        .collect();
    expenses_by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    MonthlyReport {
        from,
        to,
        total_income,
        total_expenses,
        net: total_income - total_expenses,
        months: months
            .into_iter()
            .map(|(month, (income, expenses))| MonthSummary {
                month,
                income,
                expenses,
                net: income - expenses,
            })
            .collect(),
        expenses_by_category,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetLineProgress {
    pub category_id: i64,
    pub category_name: String,
    pub allocated: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percent_used: Decimal,
    pub over_budget: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetProgress {
    pub budget_id: i64,
    pub name: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_allocated: Decimal,
    pub total_spent: Decimal,
    pub lines: Vec<BudgetLineProgress>,
    /// Expenses in the period whose category has no budget line.
    pub unbudgeted_spending: Decimal,
}

pub fn budget_progress(budget: &Budget, transactions: &[Transaction]) -> BudgetProgress {
    let mut spent: BTreeMap<Option<i64>, Decimal> = BTreeMap::new();
    for t in transactions.iter().filter(|t| {
        t.is_expense && t.transacted_at >= budget.period_start && t.transacted_at <= budget.period_end
    }) {
        *spent.entry(t.category_id).or_insert(Decimal::ZERO) += t.amount;
    }

    let lines: Vec<BudgetLineProgress> = budget
        .categories
        .iter()
        .map(|line| {
            let used = spent.remove(&Some(line.category_id)).unwrap_or(Decimal::ZERO);
            let percent_used = if line.allocated_amount.is_zero() {
                Decimal::ZERO
            } else {
                (used / line.allocated_amount * Decimal::ONE_HUNDRED).round_dp(2)
            };
            BudgetLineProgress {
                category_id: line.category_id,
                category_name: line.category_name.clone(),
                allocated: line.allocated_amount,
                spent: used,
                remaining: line.allocated_amount - used,
                percent_used,
                over_budget: used > line.allocated_amount,
            }
        })
        .collect();

    let budgeted_spent: Decimal = lines.iter().map(|l| l.spent).sum();
    let unbudgeted_spending: Decimal = spent.values().copied().sum();

    BudgetProgress {
        budget_id: budget.id,
        name: budget.name.clone(),
        period_start: budget.period_start,
        period_end: budget.period_end,
        total_allocated: budget.total_amount,
        total_spent: budgeted_spent + unbudgeted_spending,
        lines,
        unbudgeted_spending,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub month: String,
    pub month_income: Decimal,
    pub month_expenses: Decimal,
    pub month_net: Decimal,
    pub active_budgets: i64,
    pub upcoming_bills: Vec<Bill>,
    pub overdue_bills: usize,
    pub subscription_monthly_cost: Decimal,
    pub portfolio_value: Decimal,
}

/// `month_transactions` should already be limited to the current month and
/// `open_bills` to unpaid bills due soon (overdue ones included).
pub fn build_dashboard(
    today: NaiveDate,
    month_transactions: &[Transaction],
    active_budgets: i64,
    open_bills: Vec<Bill>,
    subscriptions: &[Subscription],
    holdings: &[Holding],
) -> Dashboard {
    let (income, expenses) = month_transactions.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expenses), t| {
            if t.is_expense {
                (income, expenses + t.amount)
            } else {
                (income + t.amount, expenses)
            }
        },
    );

    let overdue_bills = open_bills.iter().filter(|b| b.is_overdue(today)).count();

    Dashboard {
        month: today.format("%Y-%m").to_string(),
        month_income: income,
        month_expenses: expenses,
        month_net: income - expenses,
        active_budgets,
        upcoming_bills: open_bills,
        overdue_bills,
        subscription_monthly_cost: summarize(subscriptions, today).monthly_total,
        portfolio_value: round_money(portfolio_summary(holdings).total_value),
    }
}
