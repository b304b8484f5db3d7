use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::time::Duration;

use thiserror::Error;

use crate::application::cart_registry::DEFAULT_IDLE_TIMEOUT;
use crate::db::PoolSettings;
use crate::domain::dashboard::DashboardSettings;

const MAX_TOP_N: i64 = 1_000;
const MAX_REVENUE_WINDOW_DAYS: i64 = 3_650;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool: PoolSettings,
    pub dashboard: DashboardSettings,
    /// Carts untouched for this long are discarded.
    pub cart_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080)?;

        let pool = PoolSettings {
            max_size: parse_or(&lookup, "DB_POOL_SIZE", 10)?,
            statement_timeout: parse_opt::<u64, _>(&lookup, "DB_STATEMENT_TIMEOUT_MS")?
                .map(Duration::from_millis),
        };
        if pool.max_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_POOL_SIZE",
                value: "0".to_string(),
            });
        }

        let defaults = DashboardSettings::default();
        let dashboard = DashboardSettings {
            low_stock_threshold: parse_in_range(
                &lookup,
                "LOW_STOCK_THRESHOLD",
                defaults.low_stock_threshold,
                0..=i32::MAX,
            )?,
            top_n: parse_in_range(&lookup, "DASHBOARD_TOP_N", defaults.top_n, 1..=MAX_TOP_N)?,
            revenue_window_days: parse_in_range(
                &lookup,
                "REVENUE_WINDOW_DAYS",
                defaults.revenue_window_days,
                0..=MAX_REVENUE_WINDOW_DAYS,
            )?,
        };

        let cart_idle_timeout = Duration::from_secs(parse_in_range(
            &lookup,
            "CART_IDLE_TIMEOUT_SECS",
            DEFAULT_IDLE_TIMEOUT.as_secs(),
            1..=u64::from(u32::MAX),
        )?);

        Ok(Self {
            database_url,
            host,
            port,
            pool,
            dashboard,
            cart_idle_timeout,
        })
    }
}

fn parse_opt<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, name)?.unwrap_or(default))
}

fn parse_in_range<T, F>(
    lookup: &F,
    name: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Display,
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, name, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        })
    }
}
