// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Destination-address denylists.
//!
//! Two independent watchlists gate outbound transfers: fraud-reported
//! addresses (terminal block, reason carried to the caller) and
//! anonymity-mixer addresses (risk factor, not an automatic block).
//! Matching is case-insensitive exact match; no fuzzy or prefix matching.
//!
//! The sets are read-mostly and refreshed in the background by
//! [`crate::denylist_poller::DenylistPoller`]. A refresh replaces the whole
//! snapshot with a single atomic pointer swap, so readers never observe a
//! half-updated set. A fraud-list load failure is fatal at startup and
//! leaves the previous snapshot in place at refresh time; a mixer-list load
//! failure degrades to a built-in minimal set - a failed load must never
//! read as "no risk".

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use tracing::warn;

/// A single denylist record as served by the list source.
///
/// The fraud list historically used `comment` for the reason field; both
/// spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct DenylistRecord {
    pub address: String,
    #[serde(alias = "comment", default)]
    pub reason: String,
}

/// Result of matching one destination address against both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenylistCheck {
    pub is_fraud: bool,
    pub fraud_reason: Option<String>,
    pub is_mixer: bool,
}

/// Known mixer router addresses shipped with the binary.
pub const BUILTIN_MIXER_ADDRESSES: [&str; 5] = [
    "0x722122df12d4e14e13ac3b6895a86e84145b6967",
    "0xd90e2f925da726b50c4ed8d0fb90ad053324f31b",
    "0xd96f2b1c14db8458374d9aca76e26c3d18364307",
    "0x4736dcf1b7a3d580672cce6e7c65cd5cc9cfba9d",
    "0x169ad27a470d064dede56a2d3ff727986b15d52b",
];

/// One immutable snapshot of both lists, keyed by lowercase address.
#[derive(Debug, Default)]
pub struct DenylistSets {
    fraud: HashMap<String, String>,
    mixers: HashSet<String>,
}

impl DenylistSets {
    pub fn new(
        fraud: impl IntoIterator<Item = DenylistRecord>,
        mixers: impl IntoIterator<Item = DenylistRecord>,
    ) -> Self {
        Self {
            fraud: fraud
                .into_iter()
                .map(|r| (r.address.trim().to_lowercase(), r.reason))
                .collect(),
            mixers: mixers
                .into_iter()
                .map(|r| r.address.trim().to_lowercase())
                .collect(),
        }
    }

    /// Snapshot with the built-in mixer set, for when the mixer source is
    /// unavailable or unconfigured.
    pub fn with_builtin_mixers(fraud: impl IntoIterator<Item = DenylistRecord>) -> Self {
        Self {
            fraud: fraud
                .into_iter()
                .map(|r| (r.address.trim().to_lowercase(), r.reason))
                .collect(),
            mixers: BUILTIN_MIXER_ADDRESSES
                .iter()
                .map(|a| a.to_string())
                .collect(),
        }
    }

    pub fn fraud_len(&self) -> usize {
        self.fraud.len()
    }

    pub fn mixer_len(&self) -> usize {
        self.mixers.len()
    }
}

/// Pure lookup over the currently loaded denylist snapshot.
pub struct DenylistChecker {
    sets: RwLock<Arc<DenylistSets>>,
}

impl DenylistChecker {
    pub fn new(sets: DenylistSets) -> Self {
        Self {
            sets: RwLock::new(Arc::new(sets)),
        }
    }

    /// Match a destination address against both lists. Pure lookup, no side
    /// effects.
    pub fn check(&self, address: &str) -> DenylistCheck {
        let needle = address.trim().to_lowercase();
        let sets = self.current();
        let fraud_reason = sets.fraud.get(&needle).cloned();
        DenylistCheck {
            is_fraud: fraud_reason.is_some(),
            fraud_reason,
            is_mixer: sets.mixers.contains(&needle),
        }
    }

    /// Atomically replace the snapshot. Readers see either the old or the
    /// new sets, never a mix.
    pub fn replace(&self, sets: DenylistSets) {
        let next = Arc::new(sets);
        match self.sets.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    pub fn fraud_len(&self) -> usize {
        self.current().fraud_len()
    }

    pub fn mixer_len(&self) -> usize {
        self.current().mixer_len()
    }

    fn current(&self) -> Arc<DenylistSets> {
        match self.sets.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

/// Errors from loading denylist sources.
#[derive(Debug, thiserror::Error)]
pub enum DenylistError {
    #[error("fraud list unavailable: {0}")]
    FraudListUnavailable(String),

    #[error("failed to fetch {0}: {1}")]
    Fetch(String, String),

    #[error("failed to read {0}: {1}")]
    Read(String, String),

    #[error("failed to parse {0}: {1}")]
    Parse(String, String),
}

/// Where a list is served from.
#[derive(Debug, Clone)]
enum ListLocation {
    Url(String),
    File(PathBuf),
}

impl ListLocation {
    fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            ListLocation::Url(raw.to_string())
        } else {
            ListLocation::File(PathBuf::from(raw))
        }
    }

    fn describe(&self) -> String {
        match self {
            ListLocation::Url(url) => url.clone(),
            ListLocation::File(path) => path.display().to_string(),
        }
    }
}

/// Loader for the fraud and mixer list sources (file path or HTTP(S) URL,
/// each an ordered sequence of `{address, reason}` records).
#[derive(Debug, Clone)]
pub struct DenylistSource {
    fraud: ListLocation,
    mixer: Option<ListLocation>,
}

impl DenylistSource {
    pub fn new(fraud: &str, mixer: Option<&str>) -> Self {
        Self {
            fraud: ListLocation::parse(fraud),
            mixer: mixer.map(ListLocation::parse),
        }
    }

    /// Load both lists into a fresh snapshot.
    ///
    /// A fraud-list failure is an error the caller must treat as fatal at
    /// startup; a mixer-list failure (or an unconfigured mixer source) falls
    /// back to the built-in mixer set.
    pub async fn load(&self, http: &reqwest::Client) -> Result<DenylistSets, DenylistError> {
        let fraud = fetch_records(http, &self.fraud)
            .await
            .map_err(|e| DenylistError::FraudListUnavailable(e.to_string()))?;

        match &self.mixer {
            Some(location) => match fetch_records(http, location).await {
                Ok(mixers) => Ok(DenylistSets::new(fraud, mixers)),
                Err(e) => {
                    warn!(
                        source = %location.describe(),
                        error = %e,
                        "mixer list unavailable, falling back to built-in set"
                    );
                    Ok(DenylistSets::with_builtin_mixers(fraud))
                }
            },
            None => Ok(DenylistSets::with_builtin_mixers(fraud)),
        }
    }
}

async fn fetch_records(
    http: &reqwest::Client,
    location: &ListLocation,
) -> Result<Vec<DenylistRecord>, DenylistError> {
    match location {
        ListLocation::Url(url) => {
            let response = http
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| DenylistError::Fetch(url.clone(), e.to_string()))?;
            response
                .json::<Vec<DenylistRecord>>()
                .await
                .map_err(|e| DenylistError::Parse(url.clone(), e.to_string()))
        }
        ListLocation::File(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| DenylistError::Read(path.display().to_string(), e.to_string()))?;
            serde_json::from_str(&raw)
                .map_err(|e| DenylistError::Parse(path.display().to_string(), e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str, reason: &str) -> DenylistRecord {
        DenylistRecord {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }

    fn checker() -> DenylistChecker {
        DenylistChecker::new(DenylistSets::new(
            [record("0xBAD0000000000000000000000000000000000bad", "phishing")],
            [record("0x722122dF12D4e14e13Ac3b6895a86e84145b6967", "")],
        ))
    }

    #[test]
    fn unlisted_address_is_clean() {
        let check = checker().check("0x1111111111111111111111111111111111111111");
        assert_eq!(check, DenylistCheck::default());
    }

    #[test]
    fn fraud_match_carries_reason() {
        let check = checker().check("0xbad0000000000000000000000000000000000bad");
        assert!(check.is_fraud);
        assert_eq!(check.fraud_reason.as_deref(), Some("phishing"));
        assert!(!check.is_mixer);
    }

    #[test]
    fn matching_is_case_insensitive_both_ways() {
        let checker = checker();
        // List entry stored mixed-case, probe lowercase.
        assert!(
            checker
                .check("0x722122df12d4e14e13ac3b6895a86e84145b6967")
                .is_mixer
        );
        // List entry stored lowercase, probe upper-cased hex.
        assert!(
            checker
                .check("0xBAD0000000000000000000000000000000000BAD")
                .is_fraud
        );
    }

    #[test]
    fn no_prefix_matching() {
        let check = checker().check("0xbad0000000000000000000000000000000000ba");
        assert!(!check.is_fraud);
    }

    #[test]
    fn replace_swaps_whole_snapshot() {
        let checker = checker();
        checker.replace(DenylistSets::new(
            [record("0xfeed00000000000000000000000000000000feed", "mule account")],
            [],
        ));

        // Old entries are gone, new ones visible.
        assert!(
            !checker
                .check("0xbad0000000000000000000000000000000000bad")
                .is_fraud
        );
        let check = checker.check("0xFEED00000000000000000000000000000000FEED");
        assert!(check.is_fraud);
        assert_eq!(check.fraud_reason.as_deref(), Some("mule account"));
    }

    #[test]
    fn builtin_mixer_fallback_is_non_empty() {
        let sets = DenylistSets::with_builtin_mixers([]);
        assert!(sets.mixer_len() > 0);

        let checker = DenylistChecker::new(sets);
        assert!(
            checker
                .check("0x722122DF12D4e14e13Ac3b6895a86e84145b6967")
                .is_mixer
        );
    }

    #[test]
    fn records_parse_with_reason_or_comment_spelling() {
        let records: Vec<DenylistRecord> = serde_json::from_str(
            r#"[
                {"address": "0xaaa", "reason": "scam"},
                {"address": "0xbbb", "comment": "drainer"},
                {"address": "0xccc"}
            ]"#,
        )
        .unwrap();
        assert_eq!(records[0].reason, "scam");
        assert_eq!(records[1].reason, "drainer");
        assert_eq!(records[2].reason, "");
    }

    #[tokio::test]
    async fn file_source_loads_and_mixer_failure_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let fraud_path = dir.path().join("fraud.json");
        std::fs::write(
            &fraud_path,
            r#"[{"address": "0xBAD0000000000000000000000000000000000bad", "comment": "phishing"}]"#,
        )
        .unwrap();

        let missing_mixer = dir.path().join("missing.json");
        let source = DenylistSource::new(
            fraud_path.to_str().unwrap(),
            missing_mixer.to_str(),
        );
        let sets = source.load(&reqwest::Client::new()).await.unwrap();

        assert_eq!(sets.fraud_len(), 1);
        // Missing mixer file degrades to the built-in set.
        assert_eq!(sets.mixer_len(), BUILTIN_MIXER_ADDRESSES.len());
    }

    #[tokio::test]
    async fn missing_fraud_list_is_an_error() {
        let source = DenylistSource::new("/definitely/not/here.json", None);
        let err = source.load(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, DenylistError::FraudListUnavailable(_)));
    }
}
