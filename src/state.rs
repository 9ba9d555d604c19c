// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::transfer::TransferController;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<TransferController>,
}

impl AppState {
    pub fn new(controller: Arc<TransferController>) -> Self {
        Self { controller }
    }
}
