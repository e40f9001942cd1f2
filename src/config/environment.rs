//! Environment configuration
//!
//! Everything the service reads from the process environment, parsed once at
//! startup. Missing optional values fall back to development defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub log_level: Level,
    pub otp_ttl_minutes: i64,
    pub otp_delivery_url: Option<String>,
    pub otp_delivery_api_key: Option<String>,
    pub otp_sender: String,
    /// Seconds between auto-start sweeps; 0 disables the timer.
    pub auto_start_interval_secs: u64,
    pub run_migrations: bool,
    pub bcrypt_cost: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: "development-secret-change-me".to_string(),
            jwt_expiration: 86_400,
            cors_origins: vec!["*".to_string()],
            log_level: Level::INFO,
            otp_ttl_minutes: 10,
            otp_delivery_url: None,
            otp_delivery_api_key: None,
            otp_sender: "TripTrac <no-reply@triptrac.local>".to_string(),
            auto_start_interval_secs: 60,
            run_migrations: true,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let log_level = match lookup("LOG_LEVEL") {
            Some(raw) => raw.trim().parse::<Level>().map_err(|_| ConfigError::Invalid {
                key: "LOG_LEVEL",
                value: raw,
            })?,
            None => defaults.log_level,
        };

        let otp_ttl_minutes = parsed(&lookup, "OTP_TTL_MINUTES", defaults.otp_ttl_minutes)?;
        if otp_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "OTP_TTL_MINUTES",
                value: otp_ttl_minutes.to_string(),
            });
        }

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT", defaults.port)?,
            jwt_secret,
            jwt_expiration: parsed(&lookup, "JWT_EXPIRATION", defaults.jwt_expiration)?,
            cors_origins,
            log_level,
            otp_ttl_minutes,
            otp_delivery_url: lookup("OTP_DELIVERY_URL"),
            otp_delivery_api_key: lookup("OTP_DELIVERY_API_KEY"),
            otp_sender: lookup("OTP_SENDER").unwrap_or(defaults.otp_sender),
            auto_start_interval_secs: parsed(
                &lookup,
                "AUTO_START_INTERVAL_SECS",
                defaults.auto_start_interval_secs,
            )?,
            run_migrations: parsed(&lookup, "RUN_MIGRATIONS", defaults.run_migrations)?,
            bcrypt_cost: parsed(&lookup, "BCRYPT_COST", defaults.bcrypt_cost)?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn otp_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.otp_ttl_minutes)
    }

    /// `None` when the in-process timer is disabled.
    pub fn auto_start_interval(&self) -> Option<Duration> {
        (self.auto_start_interval_secs > 0).then(|| Duration::from_secs(self.auto_start_interval_secs))
    }
}
