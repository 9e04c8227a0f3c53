//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where records and sessions are kept.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres(String),
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => f.write_str("Memory"),
            StorageBackend::Postgres(_) => f.write_str("Postgres(<redacted>)"),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub storage: StorageBackend,
    pub log_level: Level,
    pub cors_origin: String,
    pub google_client_id: Option<String>,
    pub session_ttl: chrono::Duration,
    pub chat_delay: Duration,
    pub summary_delay: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("storage", &self.storage)
            .field("log_level", &self.log_level)
            .field("cors_origin", &self.cors_origin)
            .field("google_client_id", &self.google_client_id.as_ref().map(|_| "<redacted>"))
            .field("session_ttl", &self.session_ttl)
            .field("chat_delay", &self.chat_delay)
            .field("summary_delay", &self.summary_delay)
            .finish()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let storage = if database_url.eq_ignore_ascii_case("memory") {
            StorageBackend::Memory
        } else {
            StorageBackend::Postgres(database_url)
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Optional Google sign-in ---
        let google_client_id = std::env::var("GOOGLE_CLIENT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty());

        // --- Sessions and simulated latency ---
        let session_ttl_days: i64 = parse_var("SESSION_TTL_DAYS", 30)?;
        if session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                "must be positive".to_string(),
            ));
        }
        let chat_delay_ms: u64 = parse_var("CHAT_DELAY_MS", 1000)?;
        let summary_delay_ms: u64 = parse_var("SUMMARY_DELAY_MS", 2000)?;

        Ok(Self {
            bind_address,
            storage,
            log_level,
            cors_origin,
            google_client_id,
            session_ttl: chrono::Duration::days(session_ttl_days),
            chat_delay: Duration::from_millis(chat_delay_ms),
            summary_delay: Duration::from_millis(summary_delay_ms),
        })
    }

    /// In-memory storage, no external sign-in and no artificial delays.
    pub fn for_tests() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            storage: StorageBackend::Memory,
            log_level: Level::INFO,
            cors_origin: "http://localhost:3000".to_string(),
            google_client_id: None,
            session_ttl: chrono::Duration::days(30),
            chat_delay: Duration::ZERO,
            summary_delay: Duration::ZERO,
        }
    }
}
