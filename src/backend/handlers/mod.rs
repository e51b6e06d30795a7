pub mod bills;
pub mod budgets;
pub mod categories;
pub mod investments;
pub mod reports;
pub mod subscriptions;
pub mod transactions;
pub mod watchlist;

use axum::http::StatusCode;
use rust_decimal::Decimal;

use crate::error::{AppError, Result};

pub(crate) fn require_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Upper bound for any amount, quantity or price. Products of two bounded
/// values stay far inside `Decimal`'s range.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

fn require_bounded(field: &str, value: Decimal) -> Result<()> {
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!("{} must not exceed {}", field, MAX_AMOUNT)));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!("{} must be greater than zero", field)));
    }
    require_bounded(field, value)
}

pub(crate) fn require_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::validation(format!("{} must not be negative", field)));
    }
    require_bounded(field, value)
}

pub(crate) fn require_percentage(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(AppError::validation(format!("{} must be between 0 and 100", field)));
    }
    Ok(())
}

/// 204 when a row was deleted, 404 otherwise.
pub(crate) fn deleted(removed: bool, what: &str) -> Result<StatusCode> {
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_amount_is_one_trillion() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000_i64));
    }

    #[test]
    fn validators_reject_bad_input() {
        assert!(require_name("name", "  ").is_err());
        assert!(require_positive("amount", Decimal::ZERO).is_err());
        assert!(require_non_negative("quantity", Decimal::new(-1, 2)).is_err());
        assert!(require_non_negative("quantity", Decimal::ZERO).is_ok());
        assert!(require_percentage("target", Decimal::new(1001, 1)).is_err());
        assert!(require_percentage("target", Decimal::ONE_HUNDRED).is_ok());
        assert!(require_positive("price", MAX_AMOUNT).is_ok());
        assert!(require_positive("price", MAX_AMOUNT + Decimal::new(1, 2)).is_err());
        assert!(require_non_negative("quantity", Decimal::MAX).is_err());
        assert_eq!(deleted(true, "Bill").unwrap(), StatusCode::NO_CONTENT);
        assert!(matches!(deleted(false, "Bill"), Err(AppError::NotFound(_))));
    }
}
