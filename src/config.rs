// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup and validated
//! before the service binds its listener. Missing required secrets are
//! fatal: the gate refuses to start rather than running with a disabled
//! protection.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for the velocity store | `/data` |
//! | `GATE_STEP_UP_CREDENTIAL` | Expected step-up credential | Required |
//! | `GATE_FRAUD_LIST` | Fraud denylist source (path or URL) | Required |
//! | `GATE_MIXER_LIST` | Mixer list source (path or URL) | Optional (built-in fallback) |
//! | `GATE_LARGE_AMOUNT_THRESHOLD` | Large-amount threshold in reference units | `2` |
//! | `GATE_COOLDOWN_SECS` | Velocity cooldown window | `60` |
//! | `GATE_SUBMIT_TIMEOUT_SECS` | Ledger hand-off timeout | `30` |
//! | `GATE_DENYLIST_REFRESH_SECS` | Background denylist refresh interval | `300` |
//! | `GATE_LEDGER_RPC_URL` | EVM RPC endpoint | Holesky public node |
//! | `GATE_LEDGER_SIGNING_KEY` | Hot wallet signing key (hex) | Required |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use crate::ledger::HOLESKY;
use crate::models::{parse_amount, NATIVE_DECIMALS};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const STEP_UP_CREDENTIAL_ENV: &str = "GATE_STEP_UP_CREDENTIAL";
pub const FRAUD_LIST_ENV: &str = "GATE_FRAUD_LIST";
pub const MIXER_LIST_ENV: &str = "GATE_MIXER_LIST";
pub const LARGE_AMOUNT_THRESHOLD_ENV: &str = "GATE_LARGE_AMOUNT_THRESHOLD";
pub const COOLDOWN_SECS_ENV: &str = "GATE_COOLDOWN_SECS";
pub const SUBMIT_TIMEOUT_SECS_ENV: &str = "GATE_SUBMIT_TIMEOUT_SECS";
pub const DENYLIST_REFRESH_SECS_ENV: &str = "GATE_DENYLIST_REFRESH_SECS";
pub const LEDGER_RPC_URL_ENV: &str = "GATE_LEDGER_RPC_URL";
pub const LEDGER_SIGNING_KEY_ENV: &str = "GATE_LEDGER_SIGNING_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration missing: {0}")]
    Missing(String),

    #[error("configuration invalid: {0}: {1}")]
    Invalid(&'static str, String),
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Expected step-up credential (injected, never hardcoded).
    pub step_up_credential: String,
    /// Fraud denylist source (path or URL).
    pub fraud_list: String,
    /// Mixer list source (path or URL); built-in fallback when unset.
    pub mixer_list: Option<String>,
    /// Large-amount threshold in wei.
    pub large_amount_threshold_wei: u128,
    /// Velocity cooldown window.
    pub cooldown: chrono::Duration,
    /// Ledger hand-off timeout.
    pub submit_timeout: Duration,
    /// Background denylist refresh interval.
    pub denylist_refresh: Duration,
    /// EVM RPC endpoint.
    pub ledger_rpc_url: String,
    /// Hot wallet signing key (hex).
    pub ledger_signing_key: String,
}

impl GateConfig {
    /// Load and validate configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let threshold_raw = env_or_default(LARGE_AMOUNT_THRESHOLD_ENV, "2");
        let large_amount_threshold_wei = parse_amount(&threshold_raw, NATIVE_DECIMALS)
            .map_err(|e| ConfigError::Invalid(LARGE_AMOUNT_THRESHOLD_ENV, e))?;

        let cooldown_secs = parse_env_u64(COOLDOWN_SECS_ENV, 60)?;
        let submit_timeout_secs = parse_env_u64(SUBMIT_TIMEOUT_SECS_ENV, 30)?;
        let refresh_secs = parse_env_u64(DENYLIST_REFRESH_SECS_ENV, 300)?;

        let port: u16 = env_or_default(PORT_ENV, "8080")
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::Invalid(PORT_ENV, e.to_string()))?;

        Ok(Self {
            host: env_or_default(HOST_ENV, "0.0.0.0"),
            port,
            data_dir: PathBuf::from(env_or_default(DATA_DIR_ENV, "/data")),
            step_up_credential: env_required(STEP_UP_CREDENTIAL_ENV)?,
            fraud_list: env_required(FRAUD_LIST_ENV)?,
            mixer_list: env_optional(MIXER_LIST_ENV),
            large_amount_threshold_wei,
            cooldown: chrono::Duration::seconds(cooldown_secs as i64),
            submit_timeout: Duration::from_secs(submit_timeout_secs),
            denylist_refresh: Duration::from_secs(refresh_secs),
            ledger_rpc_url: env_or_default(LEDGER_RPC_URL_ENV, HOLESKY.rpc_url),
            ledger_signing_key: env_required(LEDGER_SIGNING_KEY_ENV)?,
        })
    }

    /// Path of the velocity store inside the data directory.
    pub fn velocity_db_path(&self) -> PathBuf {
        self.data_dir.join("velocity.redb")
    }
}

fn env_required(name: &str) -> Result<String, ConfigError> {
    env_optional(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env_optional(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::Invalid(name, e.to_string())),
        None => Ok(default),
    }
}
