//! Application configuration loaded from environment variables.

use crate::errors::{LedgerError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL (e.g. sqlite:./charity_fund.db)
    pub database_url: String,
    /// Size of the SQLite connection pool
    pub max_connections: u32,
    /// How often (in seconds) the `watch` loop runs an allocation
    pub allocation_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./charity_fund.db".to_string()),
            max_connections: env_var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| LedgerError::Config("Invalid DB_MAX_CONNECTIONS".to_string()))?,
            allocation_interval_secs: env_var("ALLOCATION_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| {
                    LedgerError::Config("Invalid ALLOCATION_INTERVAL_SECS".to_string())
                })?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| LedgerError::Config(format!("Missing env var: {key}")))
}
