use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tax treatment of the account a holding sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Taxable,
    TaxDeferred,
    TaxFree,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taxable => "taxable",
            Self::TaxDeferred => "tax_deferred",
            Self::TaxFree => "tax_free",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "taxable" => Ok(Self::Taxable),
            "tax_deferred" => Ok(Self::TaxDeferred),
            "tax_free" => Ok(Self::TaxFree),
            other => Err(format!("Unknown account type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetClass {
    pub id: i64,
    pub name: String,
    /// Target share of the portfolio, 0..=100.
    pub target_percentage: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAssetClass {
    pub name: String,
    pub target_percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub id: i64,
    pub asset_class_id: Option<i64>,
    pub asset_class_name: Option<String>,
    pub symbol: String,
    pub name: String,
    pub account_type: AccountType,
    pub quantity: Decimal,
    /// Total amount paid for the position.
    pub cost_basis: Decimal,
    pub current_price: Decimal,
    pub updated_at: NaiveDateTime,
}

impl Holding {
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.current_price
    }

    pub fn unrealized_gain(&self) -> Decimal {
        self.market_value() - self.cost_basis
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHolding {
    pub asset_class_id: Option<i64>,
    pub symbol: String,
    pub name: String,
    pub account_type: AccountType,
    pub quantity: Decimal,
    pub cost_basis: Decimal,
    pub current_price: Decimal,
}
