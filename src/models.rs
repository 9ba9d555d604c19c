// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the transfer-gate REST API, plus the
//! amount and address helpers shared with the lifecycle controller. All API
//! types derive `Serialize`/`Deserialize` and `ToSchema` for automatic JSON
//! handling and OpenAPI documentation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::gate::{RiskOutcome, RiskReason};
use crate::transfer::{Transfer, TransferState};

/// Decimals of the native reference unit.
pub const NATIVE_DECIMALS: u8 = 18;

// =============================================================================
// Validation / Amount Helpers
// =============================================================================

/// Validate a destination address (0x + 40 hex characters).
pub fn validate_destination(address: &str) -> Result<(), String> {
    if !address.starts_with("0x") {
        return Err("destination must start with 0x".to_string());
    }
    if address.len() != 42 {
        return Err("destination must be 42 characters (0x + 40 hex)".to_string());
    }
    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("destination must contain only hex characters".to_string());
    }
    Ok(())
}

/// Parse a human-readable decimal amount to wei (or token units).
pub fn parse_amount(amount: &str, decimals: u8) -> Result<u128, String> {
    let parts: Vec<&str> = amount.trim().split('.').collect();

    if parts.len() > 2 {
        return Err("invalid amount format".to_string());
    }

    let whole = parts[0]
        .parse::<u128>()
        .map_err(|_| "invalid whole number".to_string())?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(format!("too many decimal places (max {decimals})"));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| "invalid decimal".to_string())?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or_else(|| "amount overflow".to_string())
}

/// Format wei (or token units) to a human-readable amount.
pub fn format_amount(amount: u128, decimals: u8) -> String {
    if amount == 0 {
        return "0".to_string();
    }

    let divisor = 10u128.pow(decimals as u32);
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder == 0 {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{trimmed}")
        }
    }
}

// =============================================================================
// Transfer Models
// =============================================================================

/// Request to submit an outbound transfer through the risk gate.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitTransferRequest {
    /// Caller-chosen request identity; minted server-side when absent.
    /// Re-submitting the same identity is only legal while the transfer is
    /// awaiting step-up.
    #[serde(default)]
    pub request_id: Option<String>,
    /// Origin account identifier.
    pub origin_account: String,
    /// Destination address (0x + 40 hex chars).
    pub destination: String,
    /// Amount in human-readable format (e.g., "1.5").
    pub amount: String,
    /// Step-up credential, when the gate demanded one.
    #[serde(default)]
    pub step_up_credential: Option<String>,
    /// Optional ledger hand-off timeout override in seconds.
    #[serde(default)]
    pub submit_timeout_secs: Option<u64>,
}

/// Snapshot of a transfer's lifecycle state.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferResponse {
    /// Transfer identity.
    pub transfer_id: String,
    /// Current lifecycle state.
    pub state: TransferState,
    /// Verdict outcome from assessment, if it ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RiskOutcome>,
    /// Triggered risk reasons, most specific first.
    pub reasons: Vec<RiskReason>,
    /// Free-text detail: fraud-list reason, or submission failure reason
    /// ("timeout" vs "rejected: ...").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Origin account identifier.
    pub origin_account: String,
    /// Destination address.
    pub destination: String,
    /// Amount in human-readable format.
    pub amount: String,
    /// Ledger transaction hash (once submitted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Block explorer URL (once submitted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last transition timestamp (RFC 3339).
    pub updated_at: String,
}

impl From<&Transfer> for TransferResponse {
    fn from(transfer: &Transfer) -> Self {
        Self {
            transfer_id: transfer.id.clone(),
            state: transfer.state,
            outcome: transfer.verdict.as_ref().map(|v| v.outcome),
            reasons: transfer
                .verdict
                .as_ref()
                .map(|v| v.reasons.clone())
                .unwrap_or_default(),
            detail: transfer.detail.clone(),
            origin_account: transfer.origin_account.clone(),
            destination: transfer.destination.clone(),
            amount: format_amount(transfer.amount_wei, NATIVE_DECIMALS),
            tx_hash: transfer.submission.as_ref().map(|s| s.tx_hash.clone()),
            explorer_url: transfer.submission.as_ref().map(|s| s.explorer_url.clone()),
            created_at: transfer.created_at.to_rfc3339(),
            updated_at: transfer.updated_at.to_rfc3339(),
        }
    }
}

// =============================================================================
// Denylist / Health Models
// =============================================================================

/// Result of probing one address against the denylists.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DenylistCheckResponse {
    /// The probed address.
    pub address: String,
    /// Whether the address is fraud-listed.
    pub is_fraud: bool,
    /// Free-text reason from the fraud list entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Whether the address is a known mixer.
    pub is_mixer: bool,
}

/// Service liveness response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" when the service is serving.
    pub status: String,
    /// Loaded fraud denylist entries.
    pub fraud_entries: usize,
    /// Loaded mixer list entries.
    pub mixer_entries: usize,
}
