//! Process-level configuration.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_SQLITE_PATH: &str = "sqlite:household.db?mode=rwc";
const DEFAULT_ADMIN_ADDR: &str = "127.0.0.1:8788";
const DEFAULT_AUDIT_RETENTION_DAYS: u64 = 30;
const DEFAULT_AUDIT_MAX_ROWS: usize = 10_000;

/// Settings owned by the binary rather than any one component.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// SQLite URL.
    pub sqlite_url: String,
    /// Admin server bind address.
    pub admin_addr: SocketAddr,
    /// Secret the broadcast webhook requires.
    pub webhook_secret: Option<String>,
    /// Tool audit rows older than this are pruned.
    pub audit_retention: Duration,
    /// Upper bound on tool audit rows.
    pub audit_max_rows: usize,
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SQLITE_PATH` | SQLite path or URL | `sqlite:household.db?mode=rwc` |
    /// | `ADMIN_ADDR` | Admin server bind address | `127.0.0.1:8788` |
    /// | `WEBHOOK_SECRET` | Broadcast webhook secret | none |
    /// | `AUDIT_RETENTION_DAYS` | Tool audit retention | `30` |
    /// | `AUDIT_MAX_ROWS` | Tool audit row cap | `10000` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let sqlite_url = env::var("SQLITE_PATH")
            .map(|p| sqlite_url_from_path(p.trim()))
            .unwrap_or_else(|_| DEFAULT_SQLITE_PATH.to_string());

        let admin_addr = env::var("ADMIN_ADDR")
            .unwrap_or_else(|_| DEFAULT_ADMIN_ADDR.to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let webhook_secret = env::var("WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let retention_days = parse_env("AUDIT_RETENTION_DAYS", DEFAULT_AUDIT_RETENTION_DAYS)?;
        let audit_max_rows = parse_env("AUDIT_MAX_ROWS", DEFAULT_AUDIT_MAX_ROWS)?;

        Ok(Self {
            sqlite_url,
            admin_addr,
            webhook_secret,
            audit_retention: Duration::from_secs(retention_days * 24 * 60 * 60),
            audit_max_rows,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(name)),
        _ => Ok(default),
    }
}

fn sqlite_url_from_path(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", path)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error("{0} must be a non-negative integer")]
    InvalidNumber(&'static str),
}
