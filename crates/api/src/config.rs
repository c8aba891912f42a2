//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use landspice_auth::matrix::MatrixError;
use landspice_auth::session::{DEFAULT_TTL_MINUTES, MIN_SECRET_LEN};
use landspice_auth::{PermissionMatrix, SessionKeyError, StoreError};
use landspice_infra::SeedError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("SESSION_SECRET must be at least {} bytes", MIN_SECRET_LEN)]
    SecretTooShort,

    #[error("cannot read permission matrix {path}: {source}")]
    MatrixIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("permission matrix {path} rejected: {source}")]
    Matrix { path: PathBuf, source: MatrixError },

    #[error("session keys: {0}")]
    Session(#[from] SessionKeyError),

    #[error("credential store: {0}")]
    Store(#[from] StoreError),

    #[error("bootstrap admin: {0}")]
    Seed(#[from] SeedError),
}

/// Username and password of the account seeded into the in-memory store.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
    pub secure_cookies: bool,
    pub bind_addr: SocketAddr,
    pub matrix_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("session_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("secure_cookies", &self.secure_cookies)
            .field("bind_addr", &self.bind_addr)
            .field("matrix_path", &self.matrix_path)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_secret = get("SESSION_SECRET").ok_or(ConfigError::Missing("SESSION_SECRET"))?;
        if session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }

        let ttl_minutes = match get("SESSION_TTL_MINUTES") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                var: "SESSION_TTL_MINUTES",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TTL_MINUTES,
        };
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                var: "SESSION_TTL_MINUTES",
                reason: "must be positive".to_string(),
            });
        }

        let secure_cookies = match get("SECURE_COOKIES") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "SECURE_COOKIES",
                reason: format!("expected true/false, got '{raw}'"),
            })?,
            None => false,
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            }
        })?;

        let bootstrap_admin = match (get("BOOTSTRAP_ADMIN_USERNAME"), get("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("BOOTSTRAP_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("BOOTSTRAP_ADMIN_USERNAME")),
        };

        Ok(Self {
            session_secret,
            session_ttl: chrono::Duration::minutes(ttl_minutes),
            secure_cookies,
            bind_addr,
            matrix_path: get("PERMISSION_MATRIX_PATH").map(PathBuf::from),
            database_url: get("DATABASE_URL"),
            bootstrap_admin,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// The built-in matrix, or the one in `path` when given.
pub fn load_matrix(path: Option<&Path>) -> Result<PermissionMatrix, ConfigError> {
    let Some(path) = path else {
        return Ok(PermissionMatrix::landspice_default());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::MatrixIo {
        path: path.to_path_buf(),
        source,
    })?;
    PermissionMatrix::from_json(&raw).map_err(|source| ConfigError::Matrix {
        path: path.to_path_buf(),
        source,
    })
}
