// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Denylist Refresh Poller
//!
//! Background task that periodically reloads the fraud and mixer lists from
//! their sources and swaps the checker's snapshot atomically. This keeps the
//! gate's watchlists current without blocking the request path.
//!
//! ## Strategy
//!
//! Every `poll_interval` (default 5 min) the poller reloads both lists via
//! [`DenylistSource::load`]. On success the new snapshot replaces the old in
//! one atomic swap. On failure the previous snapshot is retained: the gate
//! never runs without a fraud set (the initial load at startup is fatal on
//! fraud-list failure), so a refresh failure only means staleness.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::gate::{DenylistChecker, DenylistSource};

/// Background denylist refresher.
pub struct DenylistPoller {
    checker: Arc<DenylistChecker>,
    source: DenylistSource,
    http: reqwest::Client,
    poll_interval: Duration,
}

impl DenylistPoller {
    pub fn new(
        checker: Arc<DenylistChecker>,
        source: DenylistSource,
        http: reqwest::Client,
        poll_interval: Duration,
    ) -> Self {
        Self {
            checker,
            source,
            http,
            poll_interval,
        }
    }

    /// Run the poller loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Denylist poller starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Denylist poller shutting down");
                    return;
                }
            }

            self.poll_step().await;
        }
    }

    /// Execute one refresh sweep.
    async fn poll_step(&self) {
        match self.source.load(&self.http).await {
            Ok(sets) => {
                info!(
                    fraud_entries = sets.fraud_len(),
                    mixer_entries = sets.mixer_len(),
                    "Denylist poller: refreshed sets"
                );
                self.checker.replace(sets);
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Denylist poller: refresh failed, retaining previous sets"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::gate::{DenylistRecord, DenylistSets};

    #[tokio::test]
    async fn poll_step_swaps_sets_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let fraud_path = dir.path().join("fraud.json");
        std::fs::write(
            &fraud_path,
            r#"[{"address": "0xfeed00000000000000000000000000000000feed", "reason": "mule"}]"#,
        )
        .unwrap();

        let checker = Arc::new(DenylistChecker::new(DenylistSets::new(
            [DenylistRecord {
                address: "0xstale".to_string(),
                reason: "old".to_string(),
            }],
            [],
        )));
        let poller = DenylistPoller::new(
            Arc::clone(&checker),
            DenylistSource::new(fraud_path.to_str().unwrap(), None),
            reqwest::Client::new(),
            Duration::from_secs(300),
        );

        poller.poll_step().await;

        assert!(
            checker
                .check("0xfeed00000000000000000000000000000000feed")
                .is_fraud
        );
        assert!(!checker.check("0xstale").is_fraud);
    }

    #[tokio::test]
    async fn poll_step_retains_sets_on_failure() {
        let checker = Arc::new(DenylistChecker::new(DenylistSets::new(
            [DenylistRecord {
                address: "0xbad0000000000000000000000000000000000bad".to_string(),
                reason: "phishing".to_string(),
            }],
            [],
        )));
        let poller = DenylistPoller::new(
            Arc::clone(&checker),
            DenylistSource::new("/definitely/not/here.json", None),
            reqwest::Client::new(),
            Duration::from_secs(300),
        );

        poller.poll_step().await;

        // Previous snapshot still serving.
        assert!(
            checker
                .check("0xbad0000000000000000000000000000000000bad")
                .is_fraud
        );
    }
}
