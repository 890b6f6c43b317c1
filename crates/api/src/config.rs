//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the Pawbook API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `JWT_SECRET`: Secret key used to sign access tokens (required)
//! - `TOKEN_EXPIRY_HOURS`: Lifetime of issued access tokens (default: 24)
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//!
//! Slot population (`db-migrate`) reads [`SlotPlanConfig`]:
//!
//! - `SLOT_HORIZON_DAYS`: Days to populate starting today (default: 7)
//! - `SLOT_START_HOUR` / `SLOT_END_HOUR`: Opening hours (default: 9 and 17)
//! - `SLOT_DURATION_MINUTES`: Slot length (default: 30)

use chrono::NaiveDate;
use eyre::{Result, WrapErr, ensure};
use pawbook_core::ledger::SlotPlan;
use std::{env, str::FromStr};
use tracing::Level;

/// Upper bound for `TOKEN_EXPIRY_HOURS`: one year.
pub const MAX_TOKEN_EXPIRY_HOURS: i64 = 24 * 365;

/// Configuration for the Pawbook API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use pawbook_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Secret used to sign and verify access tokens
    pub jwt_secret: String,

    /// Lifetime of an access token in hours
    pub token_expiry_hours: i64,

    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL or JWT_SECRET environment variable is not set
    /// - JWT_SECRET is empty
    /// - The API_PORT value cannot be parsed as a u16
    /// - TOKEN_EXPIRY_HOURS is not an integer between 1 and [`MAX_TOKEN_EXPIRY_HOURS`]
    /// - API_REQUEST_TIMEOUT_SECONDS is not a positive integer
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Security settings
        let jwt_secret = env::var("JWT_SECRET")
            .wrap_err("JWT_SECRET environment variable must be set")?;
        ensure!(!jwt_secret.is_empty(), "JWT_SECRET must not be empty");
        let token_expiry_hours = check_token_expiry(env_or("TOKEN_EXPIRY_HOURS", 24)?)?;

        // Performance settings
        let request_timeout: u64 = env_or("API_REQUEST_TIMEOUT_SECONDS", 30)?;
        ensure!(request_timeout > 0, "API_REQUEST_TIMEOUT_SECONDS must be positive");

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            jwt_secret,
            token_expiry_hours,
            request_timeout,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Opening hours and horizon used when pre-generating slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPlanConfig {
    pub horizon_days: u32,
    pub start_hour: u32,
    pub end_hour: u32,
    pub slot_duration_minutes: u32,
}

impl Default for SlotPlanConfig {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            start_hour: 9,
            end_hour: 17,
            slot_duration_minutes: 30,
        }
    }
}

impl SlotPlanConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            horizon_days: env_or("SLOT_HORIZON_DAYS", defaults.horizon_days)?,
            start_hour: env_or("SLOT_START_HOUR", defaults.start_hour)?,
            end_hour: env_or("SLOT_END_HOUR", defaults.end_hour)?,
            slot_duration_minutes: env_or("SLOT_DURATION_MINUTES", defaults.slot_duration_minutes)?,
        })
    }

    /// The plan covering `horizon_days` days from `from_date`.
    pub fn plan_from(&self, from_date: NaiveDate) -> SlotPlan {
        SlotPlan {
            from_date,
            num_days: self.horizon_days,
            start_hour: self.start_hour,
            end_hour: self.end_hour,
            slot_duration_minutes: self.slot_duration_minutes,
        }
    }
}

fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(name, env::var(name).ok(), default)
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .wrap_err_with(|| format!("Invalid {} value", name)),
        None => Ok(default),
    }
}

fn check_token_expiry(hours: i64) -> Result<i64> {
    ensure!(
        (1..=MAX_TOKEN_EXPIRY_HOURS).contains(&hours),
        "TOKEN_EXPIRY_HOURS must be between 1 and {}",
        MAX_TOKEN_EXPIRY_HOURS
    );
    Ok(hours)
}

/// Unknown names fall back to INFO.
pub fn parse_log_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
