//! Store configuration, read from the environment
//!
//! Every key is optional. The embedded SQLite store is picked whenever
//! `USE_SQLITE` is truthy or `DB_HOST` is unset/empty, so a bare checkout
//! runs without any setup.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::{Error, Result};

pub const ENV_USE_SQLITE: &str = "USE_SQLITE";
pub const ENV_SQLITE_PATH: &str = "SQLITE_PATH";
pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_SSLMODE: &str = "DB_SSLMODE";

pub const DEFAULT_SQLITE_PATH: &str = "trailmarks.db";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_PASSWORD: &str = "postgres";
pub const DEFAULT_DATABASE: &str = "trailmarks";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_SSL_MODE: &str = "disable";

/// Which backend the store initializer opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Embedded, file-backed SQLite (demo mode)
    Sqlite,
    /// Networked PostgreSQL (production)
    Postgres,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Sqlite => "sqlite",
            BackendKind::Postgres => "postgres",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for both backends.
#[derive(Clone)]
pub struct StoreConfig {
    pub use_sqlite: bool,
    pub sqlite_path: PathBuf,
    /// Raw `DB_HOST`; `None` or empty selects SQLite
    pub host: Option<String>,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    pub ssl_mode: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            use_sqlite: false,
            sqlite_path: PathBuf::from(DEFAULT_SQLITE_PATH),
            host: None,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            port: DEFAULT_PORT,
            ssl_mode: DEFAULT_SSL_MODE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    ///
    /// A present-but-empty value counts as set for every key except
    /// `DB_HOST`, where empty means "no networked host".
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, fallback: &str| lookup(key).unwrap_or_else(|| fallback.to_string());

        let port_raw = get(ENV_DB_PORT, &DEFAULT_PORT.to_string());
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|e| Error::Config(format!("invalid {ENV_DB_PORT} '{port_raw}': {e}")))?;

        Ok(Self {
            use_sqlite: lookup(ENV_USE_SQLITE).is_some_and(|v| is_truthy(&v)),
            sqlite_path: PathBuf::from(get(ENV_SQLITE_PATH, DEFAULT_SQLITE_PATH)),
            host: lookup(ENV_DB_HOST),
            user: get(ENV_DB_USER, DEFAULT_USER),
            password: get(ENV_DB_PASSWORD, DEFAULT_PASSWORD),
            database: get(ENV_DB_NAME, DEFAULT_DATABASE),
            port,
            ssl_mode: get(ENV_DB_SSLMODE, DEFAULT_SSL_MODE),
        })
    }

    /// Apply the backend selection policy
    pub fn backend(&self) -> BackendKind {
        let host_missing = self.host.as_deref().is_none_or(|h| h.trim().is_empty());
        if self.use_sqlite || host_missing {
            BackendKind::Sqlite
        } else {
            BackendKind::Postgres
        }
    }

    /// Networked host, falling back to `localhost`
    pub fn host(&self) -> &str {
        match self.host.as_deref().map(str::trim) {
            Some(h) if !h.is_empty() => h,
            _ => DEFAULT_HOST,
        }
    }

    pub fn pg_ssl_mode(&self) -> Result<PgSslMode> {
        PgSslMode::from_str(self.ssl_mode.trim())
            .map_err(|e| Error::Config(format!("invalid {ENV_DB_SSLMODE} '{}': {e}", self.ssl_mode)))
    }

    /// Build sqlx connect options for the networked backend
    pub fn pg_connect_options(&self) -> Result<PgConnectOptions> {
        Ok(PgConnectOptions::new()
            .host(self.host())
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(self.pg_ssl_mode()?))
    }

    /// Where the store lives, for log lines. Never includes the password.
    pub fn describe_target(&self) -> String {
        match self.backend() {
            BackendKind::Sqlite => format!("sqlite://{}", self.sqlite_path.display()),
            BackendKind::Postgres => format!(
                "postgres://{}@{}:{}/{}?sslmode={}",
                self.user,
                self.host(),
                self.port,
                self.database,
                self.ssl_mode
            ),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("use_sqlite", &self.use_sqlite)
            .field("sqlite_path", &self.sqlite_path)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// `1` or `true`, case-insensitive, surrounding whitespace ignored
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}
