// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger submitter boundary.
//!
//! The gate never inspects ledger-specific wire formats: an authorized
//! transfer is handed to a [`LedgerSubmitter`], which either returns a
//! tracking handle or rejects synchronously, and later reports the terminal
//! confirmation or failure when polled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod evm;

pub use evm::{EvmSubmitter, LedgerNetwork, HOLESKY};

/// Tracking handle returned by a successful hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmissionHandle {
    /// Ledger-side transaction hash.
    pub tx_hash: String,
    /// Block explorer URL for the submission.
    pub explorer_url: String,
}

/// Terminal outcome reported by the ledger for a submitted transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfirmation {
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Whether the ledger executed it successfully.
    pub success: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("invalid destination: {0}")]
    InvalidDestination(String),
}

/// External ledger collaborator.
///
/// `submit` is invoked exactly once per transfer by the lifecycle
/// controller; retry is a caller-initiated new transfer request, never an
/// automatic re-submission of the same one.
#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    /// Hand off an authorized transfer. Returns a tracking handle or a
    /// synchronous rejection.
    async fn submit(
        &self,
        destination: &str,
        amount_wei: u128,
    ) -> Result<SubmissionHandle, LedgerError>;

    /// Poll for the terminal outcome of a prior submission. `Ok(None)`
    /// means the ledger has not decided yet.
    async fn confirmation(
        &self,
        handle: &SubmissionHandle,
    ) -> Result<Option<LedgerConfirmation>, LedgerError>;
}
