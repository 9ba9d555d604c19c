// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Step-up authentication for flagged transfers.

/// Validates a caller-supplied secondary credential against the expected
/// value injected at startup.
///
/// The comparison is exact byte equality: no case folding, no partial match.
/// A missing credential is a failure, not "not yet requested" - whether a
/// credential was required at all is the lifecycle controller's call, made
/// from the risk verdict rather than from this return value.
pub struct StepUpAuthenticator {
    expected: String,
}

impl StepUpAuthenticator {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    pub fn authenticate(&self, supplied: Option<&str>) -> bool {
        match supplied {
            Some(credential) => credential.as_bytes() == self.expected.as_bytes(),
            None => false,
        }
    }
}
