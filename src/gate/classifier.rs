// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Risk classification for outbound transfers.
//!
//! Combines denylist hits, transfer amount, and velocity into a single
//! [`RiskVerdict`]: the outcome (allow / step-up / block) plus the ordered
//! list of reasons that produced it. Classification is a pure function of
//! its inputs; the clock only enters through the velocity result.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::denylist::DenylistCheck;
use super::velocity::VelocityCheck;

/// Default large-amount threshold: 2 ETH in wei.
pub const DEFAULT_LARGE_AMOUNT_THRESHOLD_WEI: u128 = 2_000_000_000_000_000_000;

/// Gate decision for a proposed transfer.
///
/// Ordered by severity: `Block > RequireStepUp > Allow`. The verdict outcome
/// is the maximum severity across all triggered reasons.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskOutcome {
    /// No risk factor triggered; the transfer may proceed immediately.
    Allow,
    /// One or more factors triggered; a step-up credential is required.
    RequireStepUp,
    /// Destination is fraud-listed; terminal, never overridable.
    Block,
}

/// A single triggered risk factor.
///
/// Serialized as its kebab-case code (`denylist-fraud`, `large-amount`, ...);
/// [`RiskReason::as_str`] carries the human-readable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RiskReason {
    /// Destination is on the fraud denylist.
    DenylistFraud,
    /// Destination is a known anonymity-mixer address.
    DenylistMixer,
    /// Amount at or above the large-amount threshold AND the origin account
    /// authorized a transfer within the cooldown window.
    LargeAmountAndHighVelocity,
    /// Amount at or above the large-amount threshold.
    LargeAmount,
    /// Origin account authorized a transfer within the cooldown window.
    HighVelocity,
}

impl RiskReason {
    /// Human-readable reason string reported to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskReason::DenylistFraud => "denylist: fraud",
            RiskReason::DenylistMixer => "mixer",
            RiskReason::LargeAmountAndHighVelocity => "large-amount+high-velocity",
            RiskReason::LargeAmount => "large-amount",
            RiskReason::HighVelocity => "high-velocity",
        }
    }
}

impl std::fmt::Display for RiskReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome plus the ordered reasons that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RiskVerdict {
    /// Maximum-severity outcome across all triggered reasons.
    pub outcome: RiskOutcome,
    /// Triggered reasons, most specific first.
    pub reasons: Vec<RiskReason>,
}

impl RiskVerdict {
    fn allow() -> Self {
        Self {
            outcome: RiskOutcome::Allow,
            reasons: Vec::new(),
        }
    }

    /// Joined human-readable reason list for logs and API detail fields.
    pub fn summary(&self) -> String {
        self.reasons
            .iter()
            .map(RiskReason::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Pure risk classifier.
///
/// The large-amount threshold is injected at construction time (config);
/// everything else arrives per call.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    large_amount_threshold_wei: u128,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_LARGE_AMOUNT_THRESHOLD_WEI)
    }
}

impl RiskClassifier {
    pub fn new(large_amount_threshold_wei: u128) -> Self {
        Self {
            large_amount_threshold_wei,
        }
    }

    /// Classify a proposed transfer.
    ///
    /// Rules, in precedence order:
    /// 1. A fraud-denylist hit blocks terminally; no other rule is evaluated
    ///    and no step-up can override it.
    /// 2. Otherwise the factor set is {mixer, large amount, high velocity}.
    /// 3. A non-empty factor set requires step-up, with reasons ordered
    ///    mixer first, then the combined large-amount+high-velocity reason
    ///    (replacing the two individual ones), then whichever single factor
    ///    applies.
    /// 4. An empty factor set allows the transfer.
    pub fn classify(
        &self,
        amount_wei: u128,
        denylist: &DenylistCheck,
        velocity: &VelocityCheck,
    ) -> RiskVerdict {
        if denylist.is_fraud {
            return RiskVerdict {
                outcome: RiskOutcome::Block,
                reasons: vec![RiskReason::DenylistFraud],
            };
        }

        let large = amount_wei >= self.large_amount_threshold_wei;
        let rapid = velocity.is_rapid;

        let mut reasons = Vec::new();
        if denylist.is_mixer {
            reasons.push(RiskReason::DenylistMixer);
        }
        if large && rapid {
            reasons.push(RiskReason::LargeAmountAndHighVelocity);
        } else if large {
            reasons.push(RiskReason::LargeAmount);
        } else if rapid {
            reasons.push(RiskReason::HighVelocity);
        }

        if reasons.is_empty() {
            RiskVerdict::allow()
        } else {
            RiskVerdict {
                outcome: RiskOutcome::RequireStepUp,
                reasons,
            }
        }
    }
}
