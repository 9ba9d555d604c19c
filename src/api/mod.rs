// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    gate::{RiskOutcome, RiskReason},
    models::{DenylistCheckResponse, HealthResponse, SubmitTransferRequest, TransferResponse},
    state::AppState,
    transfer::TransferState,
};

pub mod denylist;
pub mod health;
pub mod transfers;

pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .route("/health", get(health::health))
        .nest(
            "/v1",
            Router::new()
                .route("/transfers", post(transfers::submit_transfer))
                .route("/transfers/{transfer_id}", get(transfers::get_transfer))
                .route("/denylist/check", get(denylist::check_address)),
        )
        .with_state(state);

    app.merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        transfers::submit_transfer,
        transfers::get_transfer,
        denylist::check_address,
        health::health
    ),
    components(
        schemas(
            SubmitTransferRequest,
            TransferResponse,
            DenylistCheckResponse,
            HealthResponse,
            TransferState,
            RiskOutcome,
            RiskReason
        )
    ),
    tags(
        (name = "Transfers", description = "Transfer risk gate and lifecycle"),
        (name = "Denylist", description = "Destination address pre-checks"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::gate::{
        DenylistChecker, DenylistRecord, DenylistSets, RiskClassifier, StepUpAuthenticator,
        VelocityTracker,
    };
    use crate::ledger::{
        LedgerConfirmation, LedgerError, LedgerSubmitter, SubmissionHandle,
    };
    use crate::state::AppState;
    use crate::transfer::TransferController;

    /// Submitter that accepts everything and never confirms.
    struct AcceptingSubmitter;

    #[async_trait]
    impl LedgerSubmitter for AcceptingSubmitter {
        async fn submit(
            &self,
            _destination: &str,
            _amount_wei: u128,
        ) -> Result<SubmissionHandle, LedgerError> {
            Ok(SubmissionHandle {
                tx_hash: "0xabc".to_string(),
                explorer_url: "https://holesky.etherscan.io/tx/0xabc".to_string(),
            })
        }

        async fn confirmation(
            &self,
            _handle: &SubmissionHandle,
        ) -> Result<Option<LedgerConfirmation>, LedgerError> {
            Ok(None)
        }
    }

    pub(crate) fn test_state() -> AppState {
        let sets = DenylistSets::new(
            [DenylistRecord {
                address: "0xbad0000000000000000000000000000000000bad".to_string(),
                reason: "phishing".to_string(),
            }],
            [DenylistRecord {
                address: "0x722122df12d4e14e13ac3b6895a86e84145b6967".to_string(),
                reason: String::new(),
            }],
        );
        let controller = TransferController::new(
            Arc::new(DenylistChecker::new(sets)),
            VelocityTracker::ephemeral(chrono::Duration::seconds(60)),
            RiskClassifier::default(),
            StepUpAuthenticator::new("test-credential"),
            Arc::new(AcceptingSubmitter),
            Duration::from_secs(5),
        );
        AppState::new(Arc::new(controller))
    }
}
