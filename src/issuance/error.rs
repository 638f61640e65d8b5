// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issuance pipeline errors.
//!
//! Errors before content publication have no durable side effects (apart
//! from a settled payment). Errors after it leave the badge partially
//! issued and carry the badge id so it can be reconciled.

use axum::http::StatusCode;

use super::attestation::AttestationError;
use super::payment::PaymentProofError;
use crate::chain::ChainError;
use crate::content::ContentError;
use crate::error::ApiError;
use crate::storage::DocumentError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    PaymentProof(#[from] PaymentProofError),

    #[error("Error sending payment to the platform account")]
    PaymentNotSettled(#[source] ChainError),

    #[error("Error uploading badge to the content store")]
    PublishFailed(#[source] ContentError),

    #[error("IMPORTANT: Your payment has gone through but we were unable to publish the badge. Contact support for a refund.")]
    PublishFailedAfterPayment(#[source] ContentError),

    #[error("IMPORTANT: Error while updating recipient/issuer data in database. Your details may have been changed in our database but badge has not been finalized yet. Please reach out to support to reverse this.")]
    PartialFanout {
        badge_id: String,
        issuer: String,
        recipients: Vec<String>,
        failed: Vec<String>,
        reason: String,
    },

    #[error("IMPORTANT: Failed to upload badge to database. All issuer/recipient details may have been changed in our database but badge has not been finalized yet. Please reach out to support to reverse this.")]
    PartialStore {
        badge_id: String,
        issuer: String,
        recipients: Vec<String>,
        #[source]
        source: DocumentError,
    },

    #[error("IMPORTANT: Could not attest badge {badge_id} on chain. All details in the content store and our database have been successfully updated.")]
    AttestationFailed {
        badge_id: String,
        #[source]
        source: AttestationError,
    },
}

impl IssuanceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            IssuanceError::Validation(e) => e.error_code(),
            IssuanceError::PaymentProof(e) => e.error_code(),
            IssuanceError::PaymentNotSettled(_) => "PAYMENT_NOT_SETTLED",
            IssuanceError::PublishFailed(_) => "PUBLISH_FAILED",
            IssuanceError::PublishFailedAfterPayment(_) => "PUBLISH_FAILED_AFTER_PAYMENT",
            IssuanceError::PartialFanout { .. } => "PARTIAL_FANOUT_FAILURE",
            IssuanceError::PartialStore { .. } => "PARTIAL_STORE_FAILURE",
            IssuanceError::AttestationFailed { .. } => "ATTESTATION_FAILED",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            IssuanceError::Validation(ValidationError::IssuerMismatch) => StatusCode::FORBIDDEN,
            IssuanceError::Validation(_) | IssuanceError::PaymentProof(_) => {
                StatusCode::BAD_REQUEST
            }
            IssuanceError::PaymentNotSettled(_) => StatusCode::PAYMENT_REQUIRED,
            IssuanceError::PublishFailed(_) | IssuanceError::AttestationFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            IssuanceError::PublishFailedAfterPayment(_)
            | IssuanceError::PartialFanout { .. }
            | IssuanceError::PartialStore { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Badge the failure refers to, once content is published.
    pub fn badge_id(&self) -> Option<&str> {
        match self {
            IssuanceError::PartialFanout { badge_id, .. }
            | IssuanceError::PartialStore { badge_id, .. }
            | IssuanceError::AttestationFailed { badge_id, .. } => Some(badge_id),
            _ => None,
        }
    }
}

impl From<IssuanceError> for ApiError {
    fn from(err: IssuanceError) -> Self {
        let mut api = ApiError::new(err.status_code(), err.to_string()).with_code(err.error_code());
        if let Some(badge_id) = err.badge_id() {
            api = api.with_badge_id(badge_id);
        }
        api
    }
}
