//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `PETCARE_DATABASE_URL` - SQLite connection string, falls back to `DATABASE_URL`
//!   (default: `sqlite://instance/petcare.db`)
//! - `PETCARE_HOST` - Bind address (default: 127.0.0.1)
//! - `PETCARE_PORT` - Listen port (default: 5000)
//! - `PETCARE_BASE_URL` - Public URL, `https://` enables secure cookies
//!   (default: `http://localhost:5000`)
//! - `PETCARE_DISPLAY_TZ` - IANA time zone used to render timestamps in HTML
//!   (default: `Europe/Madrid`)
//! - `PETCARE_RUN_MIGRATIONS` - Apply pending migrations at startup (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono_tz::Tz;
use secrecy::SecretString;
use thiserror::Error;

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://instance/petcare.db";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_DISPLAY_TZ: Tz = chrono_tz::Europe::Madrid;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// PetCare server configuration.
#[derive(Debug, Clone)]
pub struct PetcareConfig {
    /// SQLite connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Time zone used when rendering timestamps in HTML pages
    pub display_tz: Tz,
    /// Whether to apply migrations on startup
    pub run_migrations: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl PetcareConfig {
    /// Configuration with defaults for everything except the database URL.
    ///
    /// Used by the CLI and by tests that point the server at a scratch database.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: SecretString::from(database_url.into()),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            base_url: DEFAULT_BASE_URL.to_owned(),
            display_tz: DEFAULT_DISPLAY_TZ,
            run_migrations: true,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("PETCARE_DATABASE_URL");
        let host = get_env_or_default("PETCARE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PETCARE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PETCARE_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PETCARE_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("PETCARE_BASE_URL", DEFAULT_BASE_URL);

        let display_tz = match get_optional_env("PETCARE_DISPLAY_TZ") {
            Some(raw) => parse_time_zone(&raw)
                .map_err(|e| ConfigError::InvalidEnvVar("PETCARE_DISPLAY_TZ".to_string(), e))?,
            None => DEFAULT_DISPLAY_TZ,
        };

        let run_migrations = match get_optional_env("PETCARE_RUN_MIGRATIONS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "PETCARE_RUN_MIGRATIONS".to_string(),
                    format!("expected true/false, got '{raw}'"),
                )
            })?,
            None => true,
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            display_tz,
            run_migrations,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> SecretString {
    let value = std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    SecretString::from(value)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a sample rate in `[0.0, 1.0]`.
fn parse_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Parse a boolean flag leniently.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse an IANA time zone name such as `Europe/Madrid` or `UTC`.
fn parse_time_zone(raw: &str) -> Result<Tz, String> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|e| format!("expected an IANA zone like Europe/Madrid ({e})"))
}
