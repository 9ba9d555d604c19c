// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ledger::LedgerError;
use crate::transfer::GateError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match &err {
            GateError::Validation(_) => ApiError::bad_request(err.to_string()),
            GateError::Duplicate(_) => ApiError::conflict(err.to_string()),
            GateError::NotFound(_) => ApiError::not_found(err.to_string()),
            GateError::Velocity(_) => ApiError::internal(err.to_string()),
            GateError::Ledger(LedgerError::Rejected(_)) => ApiError::unprocessable(err.to_string()),
            GateError::Ledger(_) => ApiError::service_unavailable(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let dup = ApiError::conflict("again");
        assert_eq!(dup.status, StatusCode::CONFLICT);
        assert_eq!(dup.message, "again");
    }

    #[test]
    fn gate_errors_map_to_http_statuses() {
        let validation: ApiError = GateError::Validation("bad amount".to_string()).into();
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);

        let duplicate: ApiError = GateError::Duplicate("req-1".to_string()).into();
        assert_eq!(duplicate.status, StatusCode::CONFLICT);

        let not_found: ApiError = GateError::NotFound("req-2".to_string()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let ledger: ApiError =
            GateError::Ledger(LedgerError::Unavailable("rpc down".to_string())).into();
        assert_eq!(ledger.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
