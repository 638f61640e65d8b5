// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::DocumentError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error_code: &'static str,
    /// Badge the failure refers to, for failures after content publication.
    pub badge_id: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge_id: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let error_code = match status {
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::FORBIDDEN => "FORBIDDEN",
            StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE",
            StatusCode::BAD_GATEWAY => "UPSTREAM_ERROR",
            _ => "INTERNAL_ERROR",
        };
        Self {
            status,
            message: message.into(),
            error_code,
            badge_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_code(mut self, error_code: &'static str) -> Self {
        self.error_code = error_code;
        self
    }

    pub fn with_badge_id(mut self, badge_id: impl Into<String>) -> Self {
        self.badge_id = Some(badge_id.into());
        self
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::InvalidKey(key) => {
                ApiError::bad_request(format!("Invalid identifier: {key:?}"))
            }
            DocumentError::NotFound(key) => ApiError::not_found(format!("Not found: {key}")),
            other => {
                tracing::error!(error = %other, "Document store failure");
                ApiError::internal("Database error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.error_code,
            badge_id: self.badge_id,
        });
        (self.status, body).into_response()
    }
}
