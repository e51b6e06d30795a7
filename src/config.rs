//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::env;
use std::net::SocketAddr;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} contains invalid UTF-8")]
    NotUnicode(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Value in {field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        value: String,
    },
}

pub struct EnvVars;

impl EnvVars {
    pub const DATABASE_URL: &'static str = "DATABASE_URL";
    pub const BIND_ADDR: &'static str = "BIND_ADDR";
    pub const SESSION_TTL_HOURS: &'static str = "SESSION_TTL_HOURS";
    pub const REBALANCE_THRESHOLD: &'static str = "REBALANCE_THRESHOLD";
    pub const TAX_RATE: &'static str = "TAX_RATE";
    pub const LOG_LEVEL: &'static str = "LOG_LEVEL";
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub session_ttl_hours: i64,
    /// Drift, in percentage points, before a rebalancing action is suggested.
    pub rebalance_threshold: Decimal,
    /// Flat tax rate applied by the tax-location and harvesting advice.
    pub tax_rate: Decimal,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://finance_planner.db?mode=rwc".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            session_ttl_hours: 168,
            rebalance_threshold: Decimal::new(5, 0),
            tax_rate: Decimal::new(24, 2),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let database_url = read_var(EnvVars::DATABASE_URL)?.unwrap_or(defaults.database_url);

        let bind_addr = match read_var(EnvVars::BIND_ADDR)? {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: EnvVars::BIND_ADDR.to_string(),
                value: raw,
            })?,
            None => defaults.bind_addr,
        };

        let session_ttl_hours = match read_var(EnvVars::SESSION_TTL_HOURS)? {
            Some(raw) => {
                let hours: i64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    field: EnvVars::SESSION_TTL_HOURS.to_string(),
                    value: raw.clone(),
                })?;
                check_range(EnvVars::SESSION_TTL_HOURS, hours, 1, 8760)?
            }
            None => defaults.session_ttl_hours,
        };

        let rebalance_threshold = match read_var(EnvVars::REBALANCE_THRESHOLD)? {
            Some(raw) => parse_decimal_in_range(
                EnvVars::REBALANCE_THRESHOLD,
                &raw,
                Decimal::ZERO,
                Decimal::ONE_HUNDRED,
            )?,
            None => defaults.rebalance_threshold,
        };

        let tax_rate = match read_var(EnvVars::TAX_RATE)? {
            Some(raw) => parse_decimal_in_range(EnvVars::TAX_RATE, &raw, Decimal::ZERO, Decimal::ONE)?,
            None => defaults.tax_rate,
        };

        let log_level = read_var(EnvVars::LOG_LEVEL)?.unwrap_or(defaults.log_level);

        Ok(Config {
            database_url,
            bind_addr,
            session_ttl_hours,
            rebalance_threshold,
            tax_rate,
            log_level,
        })
    }
}

/// Trimmed value of `name`, `None` when unset or blank.
fn read_var(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name.to_string())),
    }
}

fn check_range<T>(field: &str, value: T, min: T, max: T) -> Result<T, ConfigError>
where
    T: PartialOrd + ToString,
{
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn parse_decimal_in_range(
    field: &str,
    raw: &str,
    min: Decimal,
    max: Decimal,
) -> Result<Decimal, ConfigError> {
    let value = Decimal::from_str_exact(raw).map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
    })?;
    check_range(field, value, min, max)
}
