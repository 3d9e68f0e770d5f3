// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the [`Config`] loader. The
//! configuration is read once at startup; a missing or malformed required
//! value stops the process before it binds a socket.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATABASE_URL` | PostgreSQL connection string (alias `DATABASE_CONNECTION_STRING`) | Required |
//! | `CLERK_JWT_CERT` | PEM-encoded RSA public key used to verify JWTs | Required unless `CLERK_JWT_CERT_PATH` is set |
//! | `CLERK_JWT_CERT_PATH` | Path to a PEM file with the RSA public key | Required unless `CLERK_JWT_CERT` is set |
//! | `CLERK_ISSUER` | Expected JWT issuer claim | Optional |
//! | `CLERK_AUDIENCE` | Expected JWT audience claim | Optional |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DB_MAX_CONNECTIONS` | Connection pool upper bound | `10` |
//! | `DB_MIN_CONNECTIONS` | Connection pool lower bound | `2` |
//! | `DB_IDLE_TIMEOUT_SECS` | Idle connection reclaim timeout | `300` |
//! | `APP_ENVIRONMENT` | Environment label, logged at startup | `development` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Older deployments name the connection string this way.
pub const DATABASE_URL_ALIAS_ENV: &str = "DATABASE_CONNECTION_STRING";
pub const JWT_CERT_ENV: &str = "CLERK_JWT_CERT";
pub const JWT_CERT_PATH_ENV: &str = "CLERK_JWT_CERT_PATH";
pub const ISSUER_ENV: &str = "CLERK_ISSUER";
pub const AUDIENCE_ENV: &str = "CLERK_AUDIENCE";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DB_MAX_CONNECTIONS_ENV: &str = "DB_MAX_CONNECTIONS";
pub const DB_MIN_CONNECTIONS_ENV: &str = "DB_MIN_CONNECTIONS";
pub const DB_IDLE_TIMEOUT_ENV: &str = "DB_IDLE_TIMEOUT_SECS";
pub const ENVIRONMENT_ENV: &str = "APP_ENVIRONMENT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration errors. Each names the offending variable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("either CLERK_JWT_CERT or CLERK_JWT_CERT_PATH must be set")]
    MissingPublicKey,

    #[error("failed to read public key from {path}: {source}")]
    PublicKeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the JWT verification key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeySource {
    Inline(String),
    File(PathBuf),
}

/// Connection pool sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout: Duration,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            idle_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub public_key: PublicKeySource,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub host: String,
    pub port: u16,
    pub db: DbSettings,
    pub environment: String,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary lookup function. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get(DATABASE_URL_ENV)
            .or_else(|| get(DATABASE_URL_ALIAS_ENV))
            .ok_or(ConfigError::Missing(DATABASE_URL_ENV))?;

        let public_key = match (get(JWT_CERT_ENV), get(JWT_CERT_PATH_ENV)) {
            (Some(pem), _) => PublicKeySource::Inline(pem),
            (None, Some(path)) => PublicKeySource::File(PathBuf::from(path)),
            (None, None) => return Err(ConfigError::MissingPublicKey),
        };

        let defaults = DbSettings::default();
        let db = DbSettings {
            max_connections: parse_or(&get, DB_MAX_CONNECTIONS_ENV, defaults.max_connections)?,
            min_connections: parse_or(&get, DB_MIN_CONNECTIONS_ENV, defaults.min_connections)?,
            idle_timeout: Duration::from_secs(parse_or(
                &get,
                DB_IDLE_TIMEOUT_ENV,
                defaults.idle_timeout.as_secs(),
            )?),
        };
        if db.min_connections > db.max_connections {
            return Err(ConfigError::Invalid {
                name: DB_MIN_CONNECTIONS_ENV,
                value: db.min_connections.to_string(),
            });
        }

        Ok(Self {
            database_url,
            public_key,
            issuer: get(ISSUER_ENV),
            audience: get(AUDIENCE_ENV),
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&get, PORT_ENV, DEFAULT_PORT)?,
            db,
            environment: get(ENVIRONMENT_ENV).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        })
    }

    /// PEM text of the verification key, reading it from disk if configured as a path.
    pub fn public_key_pem(&self) -> Result<String, ConfigError> {
        match &self.public_key {
            PublicKeySource::Inline(pem) => Ok(pem.clone()),
            PublicKeySource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::PublicKeyFile {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
