use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read once at process start and shared through `AppState`.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jeb_api_url: String,
    pub jeb_group_token: String,
    pub jeb_timeout: Duration,
    /// Upper bound on upstream summaries pulled per sync run.
    pub sync_page_limit: u32,
    pub sync_interval: Duration,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    /// Requests per minute per client IP, 0 disables the limiter.
    pub rate_limit_per_minute: u32,
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: parse_or(&lookup, "PORT", 3000)?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./incubator.sqlite?mode=rwc".to_string()),
            jeb_api_url: required(&lookup, "JEB_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            jeb_group_token: required(&lookup, "JEB_GROUP_TOKEN")?,
            jeb_timeout: Duration::from_secs(parse_or(&lookup, "JEB_TIMEOUT_SECS", 30)?),
            sync_page_limit: parse_or(&lookup, "SYNC_PAGE_LIMIT", 1000)?,
            sync_interval: Duration::from_secs(60 * parse_or::<u64, _>(&lookup, "SYNC_INTERVAL_MINS", 60)?),
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            jwt_ttl: Duration::from_secs(parse_or(&lookup, "JWT_EXPIRES_IN_SECS", 86_400)?),
            rate_limit_per_minute: parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", 60)?,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
