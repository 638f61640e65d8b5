// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// No public key header present
    MissingPublicKey,
    /// Public key is not a base58check secp256k1 key
    InvalidPublicKey,
    /// Token is malformed
    MalformedToken,
    /// Token is not labelled ES256
    UnsupportedAlgorithm,
    /// Token signature does not verify with the public key
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Internal error
    InternalError(String),
    /// Insufficient permissions
    InsufficientPermissions,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MissingPublicKey => "missing_public_key",
            AuthError::InvalidPublicKey => "invalid_public_key",
            AuthError::MalformedToken => "malformed_token",
            AuthError::UnsupportedAlgorithm => "unsupported_algorithm",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InternalError(_) => "internal_error",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MissingPublicKey
            | AuthError::InvalidPublicKey
            | AuthError::MalformedToken
            | AuthError::UnsupportedAlgorithm
            | AuthError::InvalidSignature
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MissingPublicKey => write!(f, "X-Public-Key header is required"),
            AuthError::InvalidPublicKey => write!(f, "Public key is not a valid account key"),
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::UnsupportedAlgorithm => write!(f, "Token must be signed with ES256"),
            AuthError::InvalidSignature => {
                write!(f, "Invalid identification. Could not validate jwt with public key")
            }
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AuthError::InternalError(msg) = &self {
            tracing::error!(error = %msg, "Authentication failed internally");
        }
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn insufficient_permissions_returns_403() {
        let response = AuthError::InsufficientPermissions.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_errors_are_500() {
        let err = AuthError::InternalError("db".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "internal_error");
    }
}
