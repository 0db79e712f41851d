//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveTime;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Directory barber photos are written to.
    pub upload_dir: PathBuf,
    /// Branches a barber can be assigned to.
    pub branches: Vec<String>,
    /// Local time of day the appointment purge runs.
    pub purge_at: NaiveTime,
    /// Username of the admin seeded into an empty database.
    pub admin_user: String,
    /// Password of the seeded admin.
    pub admin_password: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BARBERSHOP_ADDR` | Server bind address | `127.0.0.1:8080` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:barbershop.db?mode=rwc` |
    /// | `UPLOAD_DIR` | Barber photo directory | `static/images/barber` |
    /// | `BRANCHES` | Comma-separated branch names | `Central,North,South` |
    /// | `PURGE_AT` | Daily purge time (`HH:MM`) | `12:30` |
    /// | `ADMIN_USER` | Seeded admin username | `admin@barbershop.local` |
    /// | `ADMIN_PASSWORD` | Seeded admin password | `admin` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = get("BARBERSHOP_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            get("SQLITE_PATH").unwrap_or_else(|| "sqlite:barbershop.db?mode=rwc".to_string());

        let upload_dir = get("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static/images/barber"));

        let branches = parse_branches(
            &get("BRANCHES").unwrap_or_else(|| "Central,North,South".to_string()),
        );
        if branches.is_empty() {
            return Err(ConfigError::NoBranches);
        }

        let purge_at_text = get("PURGE_AT").unwrap_or_else(|| "12:30".to_string());
        let purge_at = NaiveTime::parse_from_str(purge_at_text.trim(), "%H:%M")
            .map_err(|_| ConfigError::InvalidPurgeTime(purge_at_text))?;

        let admin_user = get("ADMIN_USER").unwrap_or_else(|| "admin@barbershop.local".to_string());

        let admin_password = get("ADMIN_PASSWORD").unwrap_or_else(|| {
            tracing::warn!(
                "ADMIN_PASSWORD not set. Using default password 'admin'. Set ADMIN_PASSWORD in production."
            );
            "admin".to_string()
        });

        Ok(Self {
            addr,
            database_url,
            upload_dir,
            branches,
            purge_at,
            admin_user,
            admin_password,
        })
    }

    /// Whether `branch` is one of the configured branches.
    pub fn has_branch(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }
}

fn parse_branches(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BARBERSHOP_ADDR format")]
    InvalidAddr,

    #[error("BRANCHES must name at least one branch")]
    NoBranches,

    #[error("Invalid PURGE_AT time (expected HH:MM): {0}")]
    InvalidPurgeTime(String),
}
