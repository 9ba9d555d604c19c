// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer lifecycle controller.
//!
//! Orchestrates the decision core into a state machine per transfer request:
//! validates input, consults the denylist checker and velocity tracker,
//! applies the risk classifier, gates step-up, and hands authorized
//! transfers to the ledger submitter.
//!
//! ## Concurrency
//!
//! Velocity check and commit for one origin account run inside a per-account
//! critical section, so two concurrent transfers from the same account can
//! never both read a stale "not rapid" and both authorize. The ledger
//! hand-off happens outside that section and is bounded by a
//! caller-overridable timeout; on expiry the transfer moves to
//! `SubmissionFailed("timeout")` rather than being silently abandoned or
//! retried (retry is a caller-initiated new request - double-spend risk).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::gate::{
    DenylistChecker, RiskClassifier, RiskOutcome, StepUpAuthenticator, VelocityError,
    VelocityTracker,
};
use crate::ledger::{LedgerError, LedgerSubmitter};
use crate::models::{parse_amount, validate_destination, NATIVE_DECIMALS};

use super::lifecycle::{Transfer, TransferState};

/// Domain errors surfaced by the controller.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Rejected before assessment; the caller corrects input and resubmits
    /// a new request.
    #[error("invalid transfer request: {0}")]
    Validation(String),

    /// A transfer with this identity already progressed past assessment.
    #[error("duplicate transfer request: {0}")]
    Duplicate(String),

    #[error("unknown transfer: {0}")]
    NotFound(String),

    #[error("velocity store error: {0}")]
    Velocity(#[from] VelocityError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A caller's intent to move funds, as handed to the controller.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    /// Request identity; minted when absent.
    pub request_id: Option<String>,
    pub origin_account: String,
    pub destination: String,
    /// Human-readable decimal amount.
    pub amount: String,
    pub step_up_credential: Option<String>,
    /// Ledger hand-off timeout override.
    pub submit_timeout: Option<Duration>,
}

pub struct TransferController {
    denylist: Arc<DenylistChecker>,
    velocity: VelocityTracker,
    classifier: RiskClassifier,
    step_up: StepUpAuthenticator,
    submitter: Arc<dyn LedgerSubmitter>,
    transfers: Mutex<HashMap<String, Transfer>>,
    account_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    submit_timeout: Duration,
}

impl TransferController {
    pub fn new(
        denylist: Arc<DenylistChecker>,
        velocity: VelocityTracker,
        classifier: RiskClassifier,
        step_up: StepUpAuthenticator,
        submitter: Arc<dyn LedgerSubmitter>,
        submit_timeout: Duration,
    ) -> Self {
        Self {
            denylist,
            velocity,
            classifier,
            step_up,
            submitter,
            transfers: Mutex::new(HashMap::new()),
            account_locks: Mutex::new(HashMap::new()),
            submit_timeout,
        }
    }

    pub fn denylist(&self) -> &DenylistChecker {
        &self.denylist
    }

    /// Drive a transfer request from `Created` as far as it can go in one
    /// call: to a policy stop (`Blocked`, `AwaitingStepUp`) or through the
    /// ledger hand-off (`Submitted` / `SubmissionFailed`).
    pub async fn submit(&self, request: NewTransfer) -> Result<Transfer, GateError> {
        // Validation rejects before Assessing; no risk evaluation runs.
        validate_destination(&request.destination).map_err(GateError::Validation)?;
        let amount_wei =
            parse_amount(&request.amount, NATIVE_DECIMALS).map_err(GateError::Validation)?;
        if amount_wei == 0 {
            return Err(GateError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }

        let id = request
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut transfer = Transfer::new(
            id.clone(),
            request.origin_account.clone(),
            request.destination.clone(),
            amount_wei,
        );

        // One authorization per request identity: only a transfer still
        // awaiting step-up accepts a re-submission (the credential-retry
        // path, which re-runs the full assessment). Check and registration
        // happen under one registry lock so a concurrent submission with
        // the same identity sees this one already assessing.
        {
            let mut transfers = self.lock_transfers();
            if let Some(existing) = transfers.get(&id) {
                if existing.state != TransferState::AwaitingStepUp {
                    return Err(GateError::Duplicate(id));
                }
            }
            transfer.advance(TransferState::Assessing);
            transfers.insert(id, transfer.clone());
        }

        let account_lock = self.account_lock(&request.origin_account);
        {
            let _guard = account_lock.lock().await;

            // Independent reads; both must complete before classification.
            let denylist = self.denylist.check(&request.destination);
            let velocity = self.velocity.check(&request.origin_account, Utc::now());

            let verdict = self.classifier.classify(amount_wei, &denylist, &velocity);
            tracing::info!(
                transfer_id = %transfer.id,
                outcome = ?verdict.outcome,
                reasons = %verdict.summary(),
                "transfer assessed"
            );
            transfer.verdict = Some(verdict.clone());

            match verdict.outcome {
                RiskOutcome::Block => {
                    transfer.detail = denylist.fraud_reason.clone();
                    transfer.advance(TransferState::Blocked);
                    self.store(transfer.clone());
                    return Ok(transfer);
                }
                RiskOutcome::RequireStepUp => {
                    if !self
                        .step_up
                        .authenticate(request.step_up_credential.as_deref())
                    {
                        transfer.advance(TransferState::AwaitingStepUp);
                        self.store(transfer.clone());
                        return Ok(transfer);
                    }
                    transfer.advance(TransferState::Authorized);
                }
                RiskOutcome::Allow => {
                    transfer.advance(TransferState::Authorized);
                }
            }

            // Velocity committed exactly once per authorized transfer,
            // still inside the account critical section.
            if let Err(e) = self.velocity.commit(&request.origin_account, Utc::now()) {
                // Nothing was submitted; release the identity for a retry.
                self.lock_transfers().remove(&transfer.id);
                return Err(e.into());
            }
        }

        // Ledger hand-off, outside the account critical section.
        transfer.advance(TransferState::Submitting);
        self.store(transfer.clone());

        let timeout = request.submit_timeout.unwrap_or(self.submit_timeout);
        match tokio::time::timeout(
            timeout,
            self.submitter.submit(&transfer.destination, amount_wei),
        )
        .await
        {
            Ok(Ok(handle)) => {
                transfer.submission = Some(handle);
                transfer.advance(TransferState::Submitted);
            }
            Ok(Err(e)) => {
                let reason = match &e {
                    LedgerError::Rejected(msg) => format!("rejected: {msg}"),
                    other => format!("rejected: {other}"),
                };
                transfer.detail = Some(reason);
                transfer.advance(TransferState::SubmissionFailed);
            }
            Err(_elapsed) => {
                transfer.detail = Some("timeout".to_string());
                transfer.advance(TransferState::SubmissionFailed);
            }
        }
        self.store(transfer.clone());
        Ok(transfer)
    }

    /// Snapshot of a tracked transfer.
    pub fn get(&self, id: &str) -> Option<Transfer> {
        self.lock_transfers().get(id).cloned()
    }

    /// Poll the ledger for the terminal outcome of a `Submitted` transfer
    /// and advance it to `Confirmed` or `SubmissionFailed`. Any other state
    /// is returned unchanged. A ledger query failure surfaces as an error
    /// without touching the transfer.
    pub async fn poll_confirmation(&self, id: &str) -> Result<Transfer, GateError> {
        let snapshot = self
            .get(id)
            .ok_or_else(|| GateError::NotFound(id.to_string()))?;

        if snapshot.state != TransferState::Submitted {
            return Ok(snapshot);
        }
        let Some(handle) = snapshot.submission.clone() else {
            return Ok(snapshot);
        };

        match self.submitter.confirmation(&handle).await? {
            Some(confirmation) => {
                let mut transfers = self.lock_transfers();
                let Some(transfer) = transfers.get_mut(id) else {
                    return Ok(snapshot);
                };
                // Only advance if still submitted (a concurrent poll may
                // have beaten us to the receipt).
                if transfer.state == TransferState::Submitted {
                    if confirmation.success {
                        transfer.advance(TransferState::Confirmed);
                    } else {
                        transfer.detail = Some(format!(
                            "rejected: reverted in block {}",
                            confirmation.block_number
                        ));
                        transfer.advance(TransferState::SubmissionFailed);
                    }
                }
                Ok(transfer.clone())
            }
            None => Ok(snapshot),
        }
    }

    fn store(&self, transfer: Transfer) {
        self.lock_transfers().insert(transfer.id.clone(), transfer);
    }

    fn lock_transfers(&self) -> std::sync::MutexGuard<'_, HashMap<String, Transfer>> {
        match self.transfers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn account_lock(&self, account: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = match self.account_locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(
            locks
                .entry(account.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }
}
