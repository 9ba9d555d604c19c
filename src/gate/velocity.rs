// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Velocity tracking for authorized transfers.
//!
//! Records, per origin account, the timestamp of the most recently
//! *authorized* transfer and reports whether a new request arrives within
//! the cooldown window. Query ([`VelocityTracker::check`]) and mutation
//! ([`VelocityTracker::commit`]) are split so a rejected or pending request
//! never pollutes the window; the lifecycle controller serializes
//! check+commit per account.
//!
//! Records are persisted in redb (pure Rust, ACID) and reloaded at startup,
//! so the window survives restarts.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

/// account id → millisecond timestamp of the last authorized transfer.
const VELOCITY: TableDefinition<&str, i64> = TableDefinition::new("velocity");

/// Result of a velocity query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VelocityCheck {
    pub is_rapid: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum VelocityError {
    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),
}

/// Per-account last-authorized-at tracker with a configurable cooldown.
pub struct VelocityTracker {
    db: Option<Database>,
    last_authorized: Mutex<HashMap<String, DateTime<Utc>>>,
    cooldown: Duration,
}

impl VelocityTracker {
    /// Open (or create) the persistent tracker at the given path and warm
    /// the in-memory map from persisted records.
    pub fn open(path: &Path, cooldown: Duration) -> Result<Self, VelocityError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so the first read transaction doesn't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(VELOCITY)?;
        }
        write_txn.commit()?;

        let mut map = HashMap::new();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(VELOCITY)?;
        for entry in table.iter()? {
            let (key, value) = entry?;
            if let Some(ts) = Utc.timestamp_millis_opt(value.value()).single() {
                map.insert(key.value().to_string(), ts);
            }
        }

        Ok(Self {
            db: Some(db),
            last_authorized: Mutex::new(map),
            cooldown,
        })
    }

    /// In-memory tracker without persistence (tests, ephemeral deployments).
    pub fn ephemeral(cooldown: Duration) -> Self {
        Self {
            db: None,
            last_authorized: Mutex::new(HashMap::new()),
            cooldown,
        }
    }

    /// Query whether `now` falls within the cooldown window of the account's
    /// last authorized transfer. Does not mutate state; absence of a prior
    /// record means "not rapid".
    pub fn check(&self, account: &str, now: DateTime<Utc>) -> VelocityCheck {
        let last = match self.last_authorized.lock() {
            Ok(map) => map.get(account).copied(),
            Err(poisoned) => poisoned.into_inner().get(account).copied(),
        };
        let is_rapid = match last {
            Some(at) => now - at < self.cooldown,
            None => false,
        };
        VelocityCheck { is_rapid }
    }

    /// Record an authorization. Called exactly once per authorized transfer,
    /// after authorization; never on a blocked or pending one.
    pub fn commit(&self, account: &str, now: DateTime<Utc>) -> Result<(), VelocityError> {
        if let Some(db) = &self.db {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(VELOCITY)?;
                table.insert(account, now.timestamp_millis())?;
            }
            write_txn.commit()?;
        }

        let mut map = match self.last_authorized.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.insert(account.to_string(), now);
        Ok(())
    }

    /// Timestamp of the account's last authorized transfer, if any.
    pub fn last_authorized_at(&self, account: &str) -> Option<DateTime<Utc>> {
        match self.last_authorized.lock() {
            Ok(map) => map.get(account).copied(),
            Err(poisoned) => poisoned.into_inner().get(account).copied(),
        }
    }
}
