// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"code": ..., "message": ...}` with a
//! status derived from [`ErrorKind`].

use aeromatrix_core::{CoreError, ErrorKind};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Status family, e.g. `NOT_FOUND`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

/// Errors produced by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain or storage failure from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request body, path or query could not be decoded.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Core(err) => match err.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
                ErrorKind::BadRequest => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                ErrorKind::Internal => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
                }
            },
            Self::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let reason = match &rejection {
            JsonRejection::JsonSyntaxError(_) => {
                "Syntax error in JSON payload. Check for extra commas, brackets, or incorrect formatting."
            }
            JsonRejection::JsonDataError(err) => describe_data_error(&err.body_text()),
            _ => "Malformed JSON request.",
        };
        Self::InvalidInput(reason.to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidInput(format!("{}.", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput(format!("{}.", rejection.body_text()))
    }
}

fn describe_data_error(detail: &str) -> &'static str {
    if detail.contains("orientation") {
        "Invalid orientation. Accepted values are: N, S, E, O."
    } else if detail.contains("invalid type") {
        "Invalid value type in JSON request. Please review the structure."
    } else {
        "Malformed JSON request."
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            code: code.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
