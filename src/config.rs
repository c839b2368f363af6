use std::env;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use crate::state::SessionSettings;

/// Accepted session lifetimes, one hour up to ten years.
pub const SESSION_TTL_HOURS_RANGE: RangeInclusive<i64> = 1..=10 * 365 * 24;

/// Cost factors bcrypt accepts.
pub const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub session_ttl_hours: i64,
    pub session_enforce_expiry: bool,
    pub cookie_secure: bool,
    pub cors_allowed_origin: String,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            session_ttl_hours: parse_in(
                &lookup,
                "SESSION_TTL_HOURS",
                14 * 24,
                SESSION_TTL_HOURS_RANGE,
            )?,
            session_enforce_expiry: parse_or(&lookup, "SESSION_ENFORCE_EXPIRY", false)?,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", false)?,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            bcrypt_cost: parse_in(
                &lookup,
                "BCRYPT_COST",
                bcrypt::DEFAULT_COST,
                BCRYPT_COST_RANGE,
            )?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        let ttl = Some(self.session_ttl_hours)
            .filter(|hours| SESSION_TTL_HOURS_RANGE.contains(hours))
            .and_then(Duration::try_hours)
            .ok_or_else(|| ConfigError::Invalid {
                name: "SESSION_TTL_HOURS",
                value: self.session_ttl_hours.to_string(),
            })?;
        Ok(SessionSettings {
            ttl,
            enforce_expiry: self.session_enforce_expiry,
            cookie_secure: self.cookie_secure,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Like [`parse_or`], but also rejects values outside `range`.
fn parse_in<F, T>(
    lookup: &F,
    name: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + ToString,
{
    let value = parse_or(lookup, name, default)?;
    if !range.contains(&value) {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}
