// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer lifecycle: the per-request state machine and the controller
//! that drives it from user intent to terminal outcome.

pub mod controller;
pub mod lifecycle;

pub use controller::{GateError, NewTransfer, TransferController};
pub use lifecycle::{Transfer, TransferState};
