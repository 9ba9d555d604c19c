// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service health endpoint.

use axum::{extract::State, Json};

use crate::{models::HealthResponse, state::AppState};

/// Liveness probe with denylist set sizes.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let denylist = state.controller.denylist();
    Json(HealthResponse {
        status: "ok".to_string(),
        fraud_entries: denylist.fraud_len(),
        mixer_entries: denylist.mixer_len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::api::test_support::test_state;

    #[tokio::test]
    async fn health_reports_set_sizes() {
        let response = health(State(test_state())).await;
        assert_eq!(response.0.status, "ok");
        assert_eq!(response.0.fraud_entries, 1);
        assert_eq!(response.0.mixer_entries, 1);
    }
}
