//! Configuration loading and representation.
//!
//! Everything comes from environment variables. Missing or malformed
//! required values are startup errors, never per-request ones.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Ten years. Token expiry timestamps must stay representable.
pub const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;
const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Where identities and products live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// `memory://`: process-local stores, lost on exit.
    InMemory,
    Postgres { url: String, max_connections: u32 },
}

/// Signing secret; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSecret(String);

impl AuthSecret {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl core::fmt::Debug for AuthSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AuthSecret(**redacted**)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth_secret: AuthSecret,
    pub bind_addr: SocketAddr,
    pub session_ttl: Duration,
    pub resolve_timeout: Duration,
    pub secure_cookies: bool,
    pub bootstrap_admin: Option<AdminBootstrap>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let database = if database_url == "memory://" {
            DatabaseConfig::InMemory
        } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                Some(v) => parse_number::<u32>("DATABASE_MAX_CONNECTIONS", &v)?,
                None => DEFAULT_MAX_CONNECTIONS,
            };
            if max_connections == 0 {
                return Err(ConfigError::invalid("DATABASE_MAX_CONNECTIONS", "must be at least 1"));
            }
            DatabaseConfig::Postgres {
                url: database_url,
                max_connections,
            }
        } else {
            return Err(ConfigError::invalid(
                "DATABASE_URL",
                "expected postgres://… or memory://",
            ));
        };

        let secret = get("AUTH_SECRET").ok_or(ConfigError::Missing("AUTH_SECRET"))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::invalid(
                "AUTH_SECRET",
                format!("must be at least {MIN_SECRET_LEN} bytes"),
            ));
        }

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let session_ttl = match get("SESSION_TTL_SECS") {
            Some(v) => parse_number::<u64>("SESSION_TTL_SECS", &v)?,
            None => DEFAULT_SESSION_TTL_SECS,
        };
        if session_ttl == 0 {
            return Err(ConfigError::invalid("SESSION_TTL_SECS", "must be positive"));
        }
        if session_ttl > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::invalid(
                "SESSION_TTL_SECS",
                format!("must be at most {MAX_SESSION_TTL_SECS}"),
            ));
        }

        let resolve_timeout = match get("AUTH_RESOLVE_TIMEOUT_MS") {
            Some(v) => parse_number::<u64>("AUTH_RESOLVE_TIMEOUT_MS", &v)?,
            None => DEFAULT_RESOLVE_TIMEOUT_MS,
        };
        if resolve_timeout == 0 {
            return Err(ConfigError::invalid("AUTH_RESOLVE_TIMEOUT_MS", "must be positive"));
        }

        let secure_cookies = match get("SECURE_COOKIES") {
            Some(v) => parse_bool("SECURE_COOKIES", &v)?,
            None => true,
        };

        let bootstrap_admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
        };

        Ok(Self {
            database,
            auth_secret: AuthSecret(secret),
            bind_addr,
            session_ttl: Duration::from_secs(session_ttl),
            resolve_timeout: Duration::from_millis(resolve_timeout),
            secure_cookies,
            bootstrap_admin,
        })
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::invalid(key, e.to_string()))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(key, format!("expected a boolean, got '{other}'"))),
    }
}
