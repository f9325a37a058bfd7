// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, their defaults, and [`GatewayConfig`], which
//! is loaded once at startup. Empty values are treated as unset.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `LEDGER_RPC_URL` | JSON-RPC bridge in front of the ledger canister | `http://localhost:4943/rpc` |
//! | `LEDGER_CANISTER_ID` | Canister principal sent with every call | `bkyz2-fmaaa-aaaaa-qaaaq-cai` |
//! | `LEDGER_TIMEOUT_SECS` | Per-call ledger timeout | none |
//! | `ADMIN_USERNAME` | Admin login name | `admin` |
//! | `ADMIN_PASSWORD` | Admin password; login disabled when unset | unset |
//! | `ADMIN_SESSION_TTL_SECS` | Admin token lifetime | `86400` |
//! | `TRACKING_DB_PATH` | redb file for the tracking store | in-memory |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf, time::Duration};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LEDGER_RPC_URL_ENV: &str = "LEDGER_RPC_URL";
pub const LEDGER_CANISTER_ID_ENV: &str = "LEDGER_CANISTER_ID";
pub const LEDGER_TIMEOUT_SECS_ENV: &str = "LEDGER_TIMEOUT_SECS";
pub const ADMIN_USERNAME_ENV: &str = "ADMIN_USERNAME";
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
pub const ADMIN_SESSION_TTL_SECS_ENV: &str = "ADMIN_SESSION_TTL_SECS";
/// When set, tracking data survives restarts in this redb file.
pub const TRACKING_DB_PATH_ENV: &str = "TRACKING_DB_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
/// Local replica default for `dfx start`.
pub const DEFAULT_LEDGER_RPC_URL: &str = "http://localhost:4943/rpc";
pub const DEFAULT_LEDGER_CANISTER_ID: &str = "bkyz2-fmaaa-aaaaa-qaaaq-cai";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`; anything other than `json` means pretty.
    pub fn from_env() -> Self {
        Self::parse(env_optional(LOG_FORMAT_ENV).as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Fully resolved gateway configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub ledger_rpc_url: String,
    pub ledger_canister_id: String,
    pub ledger_timeout: Option<Duration>,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub admin_session_ttl: Duration,
    pub tracking_db_path: Option<PathBuf>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_optional)
    }

    /// Resolve against an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let host = or_default(HOST_ENV, DEFAULT_HOST);
        let port = match lookup(PORT_ENV) {
            Some(raw) => parse_var::<u16>(PORT_ENV, raw)?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: HOST_ENV,
                value: host.clone(),
                reason: e.to_string(),
            })?;

        let ledger_timeout = lookup(LEDGER_TIMEOUT_SECS_ENV)
            .map(|raw| parse_var::<u64>(LEDGER_TIMEOUT_SECS_ENV, raw))
            .transpose()?
            .map(Duration::from_secs);

        let ttl_secs = match lookup(ADMIN_SESSION_TTL_SECS_ENV) {
            Some(raw) => parse_var::<u64>(ADMIN_SESSION_TTL_SECS_ENV, raw)?,
            None => DEFAULT_ADMIN_SESSION_TTL_SECS,
        };
        if ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                name: ADMIN_SESSION_TTL_SECS_ENV,
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            ledger_rpc_url: or_default(LEDGER_RPC_URL_ENV, DEFAULT_LEDGER_RPC_URL),
            ledger_canister_id: or_default(LEDGER_CANISTER_ID_ENV, DEFAULT_LEDGER_CANISTER_ID),
            ledger_timeout,
            admin_username: or_default(ADMIN_USERNAME_ENV, DEFAULT_ADMIN_USERNAME),
            admin_password: lookup(ADMIN_PASSWORD_ENV),
            admin_session_ttl: Duration::from_secs(ttl_secs),
            tracking_db_path: lookup(TRACKING_DB_PATH_ENV).map(PathBuf::from),
        })
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("bind_addr", &self.bind_addr)
            .field("ledger_rpc_url", &self.ledger_rpc_url)
            .field("ledger_canister_id", &self.ledger_canister_id)
            .field("ledger_timeout", &self.ledger_timeout)
            .field("admin_username", &self.admin_username)
            .field("admin_login_enabled", &self.admin_password.is_some())
            .field("admin_session_ttl", &self.admin_session_ttl)
            .field("tracking_db_path", &self.tracking_db_path)
            .finish()
    }
}

fn parse_var<T>(name: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value: raw,
    })
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
