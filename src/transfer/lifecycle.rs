// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer entity and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::gate::RiskVerdict;
use crate::ledger::SubmissionHandle;

/// Lifecycle state of a transfer.
///
/// ```text
/// Created → Assessing → Blocked
///                     → AwaitingStepUp → Authorized
///                     → Authorized → Submitting → Submitted → Confirmed
///                                              ↘ SubmissionFailed ↙
/// ```
///
/// `Blocked`, `SubmissionFailed` and `Confirmed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    Created,
    Assessing,
    AwaitingStepUp,
    Authorized,
    Submitting,
    Submitted,
    Blocked,
    SubmissionFailed,
    Confirmed,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferState::Blocked | TransferState::SubmissionFailed | TransferState::Confirmed
        )
    }

    /// Legal transitions of the lifecycle table.
    pub fn can_transition_to(&self, next: TransferState) -> bool {
        use TransferState::*;
        matches!(
            (self, next),
            (Created, Assessing)
                | (Assessing, Blocked)
                | (Assessing, AwaitingStepUp)
                | (Assessing, Authorized)
                | (AwaitingStepUp, Authorized)
                | (Authorized, Submitting)
                | (Submitting, Submitted)
                | (Submitting, SubmissionFailed)
                | (Submitted, Confirmed)
                | (Submitted, SubmissionFailed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Created => "created",
            TransferState::Assessing => "assessing",
            TransferState::AwaitingStepUp => "awaiting_step_up",
            TransferState::Authorized => "authorized",
            TransferState::Submitting => "submitting",
            TransferState::Submitted => "submitted",
            TransferState::Blocked => "blocked",
            TransferState::SubmissionFailed => "submission_failed",
            TransferState::Confirmed => "confirmed",
        }
    }
}

impl std::fmt::Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transfer request tracked through its lifecycle.
///
/// Owned exclusively by the [`super::TransferController`] registry; the API
/// layer only ever sees snapshots.
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Request identity (caller-supplied or minted).
    pub id: String,
    pub origin_account: String,
    pub destination: String,
    /// Amount in wei (smallest unit).
    pub amount_wei: u128,
    pub state: TransferState,
    /// Verdict produced during assessment.
    pub verdict: Option<RiskVerdict>,
    /// Free-text detail: fraud-list reason on `Blocked`, failure reason on
    /// `SubmissionFailed` (`"timeout"` vs `"rejected: ..."`).
    pub detail: Option<String>,
    /// Tracking handle once the ledger accepted the submission.
    pub submission: Option<SubmissionHandle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transfer {
    pub fn new(
        id: String,
        origin_account: String,
        destination: String,
        amount_wei: u128,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            origin_account,
            destination,
            amount_wei,
            state: TransferState::Created,
            verdict: None,
            detail: None,
            submission: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to the next lifecycle state.
    pub(crate) fn advance(&mut self, next: TransferState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transfer transition {} -> {}",
            self.state,
            next
        );
        tracing::info!(
            transfer_id = %self.id,
            from = %self.state,
            to = %next,
            "transfer state transition"
        );
        self.state = next;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TransferState::Blocked.is_terminal());
        assert!(TransferState::SubmissionFailed.is_terminal());
        assert!(TransferState::Confirmed.is_terminal());
        assert!(!TransferState::AwaitingStepUp.is_terminal());
        assert!(!TransferState::Submitted.is_terminal());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        use TransferState::*;
        let all = [
            Created,
            Assessing,
            AwaitingStepUp,
            Authorized,
            Submitting,
            Submitted,
            Blocked,
            SubmissionFailed,
            Confirmed,
        ];
        for terminal in [Blocked, SubmissionFailed, Confirmed] {
            for next in all {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn created_only_enters_assessing() {
        use TransferState::*;
        assert!(Created.can_transition_to(Assessing));
        assert!(!Created.can_transition_to(Authorized));
        assert!(!Created.can_transition_to(Blocked));
    }

    #[test]
    fn step_up_never_escalates_past_authorized() {
        use TransferState::*;
        assert!(AwaitingStepUp.can_transition_to(Authorized));
        assert!(!AwaitingStepUp.can_transition_to(Submitting));
        assert!(!AwaitingStepUp.can_transition_to(Submitted));
    }

    #[test]
    fn advance_updates_timestamp() {
        let mut transfer = Transfer::new(
            "t-1".to_string(),
            "acct-1".to_string(),
            "0x1111111111111111111111111111111111111111".to_string(),
            1,
        );
        let created = transfer.updated_at;
        transfer.advance(TransferState::Assessing);
        assert_eq!(transfer.state, TransferState::Assessing);
        assert!(transfer.updated_at >= created);
    }
}
