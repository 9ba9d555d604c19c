// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Denylist pre-check endpoint.
//!
//! Lets the wallet frontend probe a destination address before the user
//! submits, so the "address flagged" warning can render early. The probe is
//! advisory: the authoritative check always re-runs inside the transfer
//! assessment.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::ApiError,
    models::{validate_destination, DenylistCheckResponse},
    state::AppState,
};

/// Query parameters for the denylist probe.
#[derive(Debug, Deserialize, IntoParams)]
pub struct DenylistCheckQuery {
    /// Destination address to probe (0x + 40 hex chars).
    pub address: String,
}

/// Probe an address against the fraud and mixer lists.
#[utoipa::path(
    get,
    path = "/v1/denylist/check",
    tag = "Denylist",
    params(DenylistCheckQuery),
    responses(
        (status = 200, description = "Denylist probe result", body = DenylistCheckResponse),
        (status = 400, description = "Malformed address")
    )
)]
pub async fn check_address(
    State(state): State<AppState>,
    Query(query): Query<DenylistCheckQuery>,
) -> Result<Json<DenylistCheckResponse>, ApiError> {
    validate_destination(&query.address).map_err(ApiError::bad_request)?;

    let check = state.controller.denylist().check(&query.address);
    Ok(Json(DenylistCheckResponse {
        address: query.address,
        is_fraud: check.is_fraud,
        reason: check.fraud_reason,
        is_mixer: check.is_mixer,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;

    use crate::api::test_support::test_state;

    #[tokio::test]
    async fn probe_reports_fraud_listing() {
        let state = test_state();
        let response = check_address(
            State(state),
            Query(DenylistCheckQuery {
                address: "0xBAD0000000000000000000000000000000000bad".to_string(),
            }),
        )
        .await
        .unwrap();

        assert!(response.0.is_fraud);
        assert_eq!(response.0.reason.as_deref(), Some("phishing"));
    }

    #[tokio::test]
    async fn probe_rejects_malformed_address() {
        let state = test_state();
        let err = check_address(
            State(state),
            Query(DenylistCheckQuery {
                address: "garbage".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
