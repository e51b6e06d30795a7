//! Tax-location and tax-loss-harvesting advice from static lookup tables.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{AccountType, Holding};
use crate::util::round_money;

const TAX_DEFERRED_KEYWORDS: &[&str] = &["bond", "fixed", "reit", "real estate"];
const TAX_FREE_KEYWORDS: &[&str] = &["growth", "small cap", "emerging"];
const TAXABLE_KEYWORDS: &[&str] = &["index", "municipal", "international", "cash"];

/// Preferred account for an asset class, by keyword. Checked in the order
/// deferred, free, taxable so "International Bond" lands in tax-deferred.
pub fn preferred_account(class_name: &str) -> Option<AccountType> {
    let lower = class_name.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if matches(TAX_DEFERRED_KEYWORDS) {
        Some(AccountType::TaxDeferred)
    } else if matches(TAX_FREE_KEYWORDS) {
        Some(AccountType::TaxFree)
    } else if matches(TAXABLE_KEYWORDS) {
        Some(AccountType::Taxable)
    } else {
        None
    }
}

/// Assumed annual taxable yield of a class.
pub fn assumed_yield(class_name: &str) -> Decimal {
    let lower = class_name.to_lowercase();
    if lower.contains("reit") || lower.contains("real estate") {
        Decimal::new(5, 2)
    } else if lower.contains("bond") || lower.contains("fixed") {
        Decimal::new(4, 2)
    } else if lower.contains("growth") || lower.contains("small cap") || lower.contains("emerging") {
        Decimal::new(7, 2)
    } else {
        Decimal::new(2, 2)
    }
}

fn class_label(h: &Holding) -> &str {
    h.asset_class_name.as_deref().unwrap_or(&h.name)
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxLocationSuggestion {
    pub holding_id: i64,
    pub symbol: String,
    pub asset_class: String,
    pub current_account: AccountType,
    pub preferred_account: AccountType,
    pub market_value: Decimal,
    pub estimated_annual_savings: Decimal,
    pub reason: String,
}

pub fn tax_location(holdings: &[Holding], tax_rate: Decimal) -> Vec<TaxLocationSuggestion> {
    let mut out: Vec<TaxLocationSuggestion> = holdings
        .iter()
        .filter_map(|h| {
            let label = class_label(h);
            let preferred = preferred_account(label)?;
            if preferred == h.account_type {
                return None;
            }
            let market_value = h.market_value();
            Some(TaxLocationSuggestion {
                holding_id: h.id,
                symbol: h.symbol.clone(),
                asset_class: label.to_string(),
                current_account: h.account_type,
                preferred_account: preferred,
                market_value,
                estimated_annual_savings: round_money(market_value * assumed_yield(label) * tax_rate),
                reason: format!(
                    "{} is usually held in a {} account",
                    label,
                    preferred.as_str().replace('_', "-")
                ),
            })
        })
        .collect();

    out.sort_by(|a, b| b.estimated_annual_savings.cmp(&a.estimated_annual_savings));
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestOpportunity {
    pub holding_id: i64,
    pub symbol: String,
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub unrealized_loss: Decimal,
    pub estimated_tax_savings: Decimal,
}

/// Taxable positions sitting on a loss of at least `min_loss`, largest loss first.
pub fn tax_loss_harvesting(
    holdings: &[Holding],
    min_loss: Decimal,
    tax_rate: Decimal,
) -> Vec<HarvestOpportunity> {
    let mut out: Vec<HarvestOpportunity> = holdings
        .iter()
        .filter(|h| h.account_type == AccountType::Taxable)
        .filter_map(|h| {
            let loss = -h.unrealized_gain();
            if loss <= Decimal::ZERO || loss < min_loss {
                return None;
            }
            Some(HarvestOpportunity {
                holding_id: h.id,
                symbol: h.symbol.clone(),
                market_value: h.market_value(),
                cost_basis: h.cost_basis,
                unrealized_loss: loss,
                estimated_tax_savings: round_money(loss * tax_rate),
            })
        })
        .collect();

    out.sort_by(|a, b| b.unrealized_loss.cmp(&a.unrealized_loss));
    out
}
