// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer endpoints: submit a transfer through the risk gate and poll
//! its lifecycle state.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::ApiError,
    models::{SubmitTransferRequest, TransferResponse},
    state::AppState,
    transfer::NewTransfer,
};

/// Submit an outbound transfer.
///
/// Runs validation, risk assessment, and - when authorized - the ledger
/// hand-off in one call. A transfer flagged for step-up is parked in
/// `awaiting_step_up`; re-submit the same `request_id` with the credential
/// attached to resolve it.
#[utoipa::path(
    post,
    path = "/v1/transfers",
    tag = "Transfers",
    request_body = SubmitTransferRequest,
    responses(
        (status = 200, description = "Transfer assessed and tracked", body = TransferResponse),
        (status = 400, description = "Invalid destination or amount"),
        (status = 409, description = "Request identity already past assessment"),
        (status = 503, description = "Ledger unavailable")
    )
)]
pub async fn submit_transfer(
    State(state): State<AppState>,
    Json(request): Json<SubmitTransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    let new_transfer = NewTransfer {
        request_id: request.request_id,
        origin_account: request.origin_account,
        destination: request.destination,
        amount: request.amount,
        step_up_credential: request.step_up_credential,
        submit_timeout: request.submit_timeout_secs.map(Duration::from_secs),
    };

    let transfer = state.controller.submit(new_transfer).await?;
    Ok(Json(TransferResponse::from(&transfer)))
}

/// Get the current state of a transfer.
///
/// For `submitted` transfers this polls the ledger for a receipt and
/// advances the transfer to `confirmed` or `submission_failed`.
#[utoipa::path(
    get,
    path = "/v1/transfers/{transfer_id}",
    tag = "Transfers",
    params(
        ("transfer_id" = String, Path, description = "Transfer identity")
    ),
    responses(
        (status = 200, description = "Transfer state", body = TransferResponse),
        (status = 404, description = "Unknown transfer"),
        (status = 503, description = "Ledger unavailable")
    )
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<String>,
) -> Result<Json<TransferResponse>, ApiError> {
    let transfer = state.controller.poll_confirmation(&transfer_id).await?;
    Ok(Json(TransferResponse::from(&transfer)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;

    use crate::api::test_support::test_state;
    use crate::transfer::TransferState;

    #[tokio::test]
    async fn submit_maps_validation_failure_to_bad_request() {
        let state = test_state();
        let request = SubmitTransferRequest {
            request_id: None,
            origin_account: "acct-1".to_string(),
            destination: "not-an-address".to_string(),
            amount: "1".to_string(),
            step_up_credential: None,
            submit_timeout_secs: None,
        };

        let err = submit_transfer(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn submit_and_fetch_round_trip() {
        let state = test_state();
        let request = SubmitTransferRequest {
            request_id: Some("req-1".to_string()),
            origin_account: "acct-1".to_string(),
            destination: "0x1111111111111111111111111111111111111111".to_string(),
            amount: "0.5".to_string(),
            step_up_credential: None,
            submit_timeout_secs: None,
        };

        let submitted = submit_transfer(State(state.clone()), Json(request))
            .await
            .unwrap();
        assert_eq!(submitted.0.state, TransferState::Submitted);
        assert_eq!(submitted.0.amount, "0.5");

        let fetched = get_transfer(State(state), Path("req-1".to_string()))
            .await
            .unwrap();
        assert_eq!(fetched.0.transfer_id, "req-1");
    }

    #[tokio::test]
    async fn unknown_transfer_is_not_found() {
        let state = test_state();
        let err = get_transfer(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_request_identity_conflicts() {
        let state = test_state();
        let request = SubmitTransferRequest {
            request_id: Some("req-1".to_string()),
            origin_account: "acct-1".to_string(),
            destination: "0x1111111111111111111111111111111111111111".to_string(),
            amount: "0.5".to_string(),
            step_up_credential: None,
            submit_timeout_secs: None,
        };

        submit_transfer(State(state.clone()), Json(request.clone()))
            .await
            .unwrap();
        let err = submit_transfer(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
