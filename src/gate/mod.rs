// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pure decision core for the transfer risk gate.
//!
//! - `denylist` - destination-address watchlists (fraud, mixer)
//! - `velocity` - cooldown tracking per origin account
//! - `classifier` - combines risk factors into a verdict
//! - `stepup` - secondary-credential validation
//!
//! Nothing in this module touches the transfer lifecycle or the ledger;
//! the components here are consulted by the [`crate::transfer`] controller.

pub mod classifier;
pub mod denylist;
pub mod stepup;
pub mod velocity;

pub use classifier::{RiskClassifier, RiskOutcome, RiskReason, RiskVerdict};
pub use denylist::{
    DenylistCheck, DenylistChecker, DenylistError, DenylistRecord, DenylistSets, DenylistSource,
};
pub use stepup::StepUpAuthenticator;
pub use velocity::{VelocityCheck, VelocityError, VelocityTracker};
