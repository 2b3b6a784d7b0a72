//! Server configuration loaded from the process environment.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup reads every tunable once through `ServerConfig::from_env` and hands
//! the resulting value to `AppState`. Parsing goes through a lookup closure so
//! tests can feed a map instead of mutating process-wide env vars.

use std::time::Duration;

use crate::services::login_codes::LoginCodePolicy;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SESSION_TTL_HOURS: u64 = 24 * 7;
const DEFAULT_LOGIN_CODE_TTL_MINUTES: u64 = 10;
const DEFAULT_LOGIN_CODE_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Which implementation backs server-side sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Postgres,
    Memory,
}

/// Resend credentials for delivering login codes by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub session_ttl: Duration,
    pub session_backend: SessionBackend,
    /// Return freshly issued login codes in the HTTP response (local dev only).
    pub echo_login_codes: bool,
    pub mail: Option<MailConfig>,
    pub login_codes: LoginCodePolicy,
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a value fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let ttl_hours = parse_or(&lookup, "SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        if ttl_hours == 0 {
            return Err(ConfigError::Invalid { key: "SESSION_TTL_HOURS", value: "0".into() });
        }

        let code_ttl_minutes = parse_or(&lookup, "LOGIN_CODE_TTL_MINUTES", DEFAULT_LOGIN_CODE_TTL_MINUTES)?;
        if code_ttl_minutes == 0 {
            return Err(ConfigError::Invalid { key: "LOGIN_CODE_TTL_MINUTES", value: "0".into() });
        }
        let max_attempts = parse_or(&lookup, "LOGIN_CODE_MAX_ATTEMPTS", DEFAULT_LOGIN_CODE_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid { key: "LOGIN_CODE_MAX_ATTEMPTS", value: "0".into() });
        }

        let session_backend = match lookup("SESSION_BACKEND").as_deref().map(str::trim) {
            None | Some("" | "postgres") => SessionBackend::Postgres,
            Some("memory") => SessionBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid { key: "SESSION_BACKEND", value: other.to_owned() });
            }
        };

        let echo_login_codes = match lookup("AUTH_ECHO_CODES") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "AUTH_ECHO_CODES", value: raw })?,
        };

        let mail = match (lookup("RESEND_API_KEY"), lookup("RESEND_FROM")) {
            (Some(api_key), Some(from)) if !api_key.trim().is_empty() && !from.trim().is_empty() => {
                Some(MailConfig { api_key, from })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            port,
            db_max_connections,
            session_ttl: Duration::from_secs(ttl_hours * 3600),
            session_backend,
            echo_login_codes,
            mail,
            login_codes: LoginCodePolicy { ttl: Duration::from_secs(code_ttl_minutes * 60), max_attempts },
        })
    }
}

/// Parse common truthy/falsy spellings.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Parse an env var with a fallback, ignoring malformed values.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
