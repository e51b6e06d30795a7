//! Allocation drift against per-class targets.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{AssetClass, Holding};
use crate::util::round_money;

pub const UNCLASSIFIED: &str = "Unclassified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebalanceLine {
    pub asset_class_id: Option<i64>,
    pub asset_class: String,
    pub current_value: Decimal,
    pub current_percentage: Decimal,
    pub target_percentage: Decimal,
    /// Target minus current, in percentage points.
    pub drift: Decimal,
    /// Positive means buy this much, negative means sell.
    pub delta_amount: Decimal,
    pub action: RebalanceAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebalancePlan {
    pub total_value: Decimal,
    pub threshold: Decimal,
    /// Sum of the configured targets; anything but 100 deserves a warning in the UI.
    pub target_total: Decimal,
    pub lines: Vec<RebalanceLine>,
}

fn value_by_class(holdings: &[Holding]) -> BTreeMap<Option<i64>, (String, Decimal)> {
    let mut by_class: BTreeMap<Option<i64>, (String, Decimal)> = BTreeMap::new();
    for h in holdings {
        let name = h
            .asset_class_name
            .clone()
            .unwrap_or_else(|| UNCLASSIFIED.to_string());
        let entry = by_class
            .entry(h.asset_class_id)
            .or_insert_with(|| (name, Decimal::ZERO));
        entry.1 += h.market_value();
    }
    by_class
}

fn percentage_of(value: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        (value / total * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

/// One line per target class plus one per held class without a target.
///
/// `delta_amount` is `(target% - current%) / 100 * total`, using the reported
/// (2 dp) current percentage.
pub fn rebalance(holdings: &[Holding], targets: &[AssetClass], threshold: Decimal) -> RebalancePlan {
    let mut values = value_by_class(holdings);
    let total_value: Decimal = values.values().map(|(_, v)| *v).sum();

    let mut lines = Vec::with_capacity(targets.len() + 1);
    for target in targets {
        let current_value = values
            .remove(&Some(target.id))
            .map(|(_, v)| v)
            .unwrap_or(Decimal::ZERO);
        lines.push(line(
            Some(target.id),
            target.name.clone(),
            current_value,
            target.target_percentage,
            total_value,
            threshold,
        ));
    }
    for (class_id, (name, current_value)) in values {
        lines.push(line(class_id, name, current_value, Decimal::ZERO, total_value, threshold));
    }

    RebalancePlan {
        total_value,
        threshold,
        target_total: targets.iter().map(|t| t.target_percentage).sum(),
        lines,
    }
}

fn line(
    asset_class_id: Option<i64>,
    asset_class: String,
    current_value: Decimal,
    target_percentage: Decimal,
    total_value: Decimal,
    threshold: Decimal,
) -> RebalanceLine {
    let current_percentage = percentage_of(current_value, total_value);
    let drift = target_percentage - current_percentage;
    let delta_amount = round_money(drift / Decimal::ONE_HUNDRED * total_value);

    let action = if drift > threshold {
        RebalanceAction::Buy
    } else if drift < -threshold {
        RebalanceAction::Sell
    } else {
        RebalanceAction::Hold
    };

    RebalanceLine {
        asset_class_id,
        asset_class,
        current_value,
        current_percentage,
        target_percentage,
        drift,
        delta_amount,
        action,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationSlice {
    pub asset_class: String,
    pub value: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub holdings_count: usize,
    pub total_value: Decimal,
    pub total_cost_basis: Decimal,
    pub unrealized_gain: Decimal,
    pub gain_percentage: Decimal,
    pub allocation: Vec<AllocationSlice>,
}

pub fn portfolio_summary(holdings: &[Holding]) -> PortfolioSummary {
    let values = value_by_class(holdings);
    let total_value: Decimal = values.values().map(|(_, v)| *v).sum();
    let total_cost_basis: Decimal = holdings.iter().map(|h| h.cost_basis).sum();
    let unrealized_gain: Decimal = holdings.iter().map(Holding::unrealized_gain).sum();

    let mut allocation: Vec<AllocationSlice> = values
        .into_values()
        .map(|(asset_class, value)| AllocationSlice {
            percentage: percentage_of(value, total_value),
            asset_class,
            value,
        })
        .collect();
    allocation.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.asset_class.cmp(&b.asset_class)));

    PortfolioSummary {
        holdings_count: holdings.len(),
        total_value,
        total_cost_basis,
        unrealized_gain,
        gain_percentage: percentage_of(unrealized_gain, total_cost_basis),
        allocation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::AccountType;
    use chrono::NaiveDate;

    fn holding(id: i64, class: Option<(i64, &str)>, qty: i64, price: i64, cost: i64) -> Holding {
        Holding {
            id,
            asset_class_id: class.map(|(id, _)| id),
            asset_class_name: class.map(|(_, n)| n.to_string()),
            symbol: format!("SYM{}", id),
            name: format!("Holding {}", id),
            account_type: AccountType::Taxable,
            quantity: Decimal::from(qty),
            cost_basis: Decimal::from(cost),
            current_price: Decimal::from(price),
            updated_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn class(id: i64, name: &str, pct: i64) -> AssetClass {
        AssetClass {
            id,
            name: name.to_string(),
            target_percentage: Decimal::from(pct),
        }
    }

    #[test]
    fn deltas_follow_target_minus_current_times_total() {
        // 7000 stocks, 3000 bonds against a 60/40 target
        let holdings = vec![
            holding(1, Some((1, "Stocks")), 70, 100, 6000),
            holding(2, Some((2, "Bonds")), 30, 100, 3100),
        ];
        let targets = vec![class(1, "Stocks", 60), class(2, "Bonds", 40)];
        let plan = rebalance(&holdings, &targets, Decimal::from(5));

        assert_eq!(plan.total_value, Decimal::from(10000));
        assert_eq!(plan.target_total, Decimal::ONE_HUNDRED);

        let stocks = &plan.lines[0];
        assert_eq!(stocks.current_percentage, Decimal::from(70));
        assert_eq!(stocks.delta_amount, Decimal::from(-1000));
        assert_eq!(stocks.action, RebalanceAction::Sell);

        let bonds = &plan.lines[1];
        assert_eq!(bonds.delta_amount, Decimal::from(1000));
        assert_eq!(bonds.action, RebalanceAction::Buy);

        for l in &plan.lines {
            let expected = round_money(
                (l.target_percentage - l.current_percentage) / Decimal::ONE_HUNDRED * plan.total_value,
            );
            assert_eq!(l.delta_amount, expected);
        }
    }

    #[test]
    fn small_drift_is_held() {
        let holdings = vec![
            holding(1, Some((1, "Stocks")), 62, 100, 0),
            holding(2, Some((2, "Bonds")), 38, 100, 0),
        ];
        let targets = vec![class(1, "Stocks", 60), class(2, "Bonds", 40)];

        let plan = rebalance(&holdings, &targets, Decimal::from(5));
        assert!(plan.lines.iter().all(|l| l.action == RebalanceAction::Hold));

        // a tighter threshold turns the same drift into trades
        let plan = rebalance(&holdings, &targets, Decimal::ONE);
        assert_eq!(plan.lines[0].action, RebalanceAction::Sell);
        assert_eq!(plan.lines[1].action, RebalanceAction::Buy);
    }

    #[test]
    fn unclassified_holdings_have_zero_target() {
        let holdings = vec![
            holding(1, Some((1, "Stocks")), 50, 100, 0),
            holding(2, None, 50, 100, 0),
        ];
        let targets = vec![class(1, "Stocks", 100), class(3, "Cash", 0)];
        let plan = rebalance(&holdings, &targets, Decimal::from(5));

        assert_eq!(plan.lines.len(), 3);
        let unclassified = plan.lines.iter().find(|l| l.asset_class == UNCLASSIFIED).unwrap();
        assert_eq!(unclassified.target_percentage, Decimal::ZERO);
        assert_eq!(unclassified.delta_amount, Decimal::from(-5000));
        let cash = plan.lines.iter().find(|l| l.asset_class == "Cash").unwrap();
        assert_eq!(cash.current_value, Decimal::ZERO);
        assert_eq!(cash.action, RebalanceAction::Hold);
    }

    #[test]
    fn empty_portfolio_has_zero_deltas() {
        let targets = vec![class(1, "Stocks", 60), class(2, "Bonds", 40)];
        let plan = rebalance(&[], &targets, Decimal::from(5));
        assert_eq!(plan.total_value, Decimal::ZERO);
        assert!(plan.lines.iter().all(|l| l.delta_amount.is_zero()));
        assert!(plan.lines.iter().all(|l| l.current_percentage.is_zero()));
    }

    #[test]
    fn summary_reports_gain_and_allocation() {
        let holdings = vec![
            holding(1, Some((1, "Stocks")), 10, 150, 1000),
            holding(2, Some((2, "Bonds")), 10, 50, 500),
        ];
        let summary = portfolio_summary(&holdings);

        assert_eq!(summary.total_value, Decimal::from(2000));
        assert_eq!(summary.total_cost_basis, Decimal::from(1500));
        assert_eq!(summary.unrealized_gain, Decimal::from(500));
        assert_eq!(summary.gain_percentage, Decimal::new(3333, 2));
        assert_eq!(summary.allocation[0].asset_class, "Stocks");
        assert_eq!(summary.allocation[0].percentage, Decimal::from(75));
    }
}
