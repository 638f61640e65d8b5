// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Badge Issuance Pipeline
//!
//! `create_badge` drives a badge through these stages, strictly in order:
//!
//! ```text
//! Validating -> VerifyingPayment (bulk only) -> PublishingContent
//!   -> FanningOut -> StoringRecord -> Attesting -> Done
//! ```
//!
//! Nothing is rolled back. A failure after publication leaves the badge
//! partially issued; those failures (and a publish failure after a settled
//! payment) are written to the reconciliation log.

pub mod attestation;
pub mod error;
pub mod fanout;
pub mod payment;

use std::fmt;

use crate::chain::{ChainClient, RemoteSigner};
use crate::config::IssuanceConfig;
use crate::content::{canonical_json, ContentError, ContentStore};
use crate::models::{Badge, BadgeContent, CreateBadgeRequest};
use crate::storage::{
    BadgeRepository, DocumentStore, ReconciliationEvent, ReconciliationKind, ReconciliationLog,
    UserRepository,
};
use crate::validation::validate_badge_request;

pub use attestation::{AttestationError, AttestationPoster};
pub use error::IssuanceError;
pub use fanout::{fan_out, FanoutFailure};
pub use payment::{encode_uvarint, verify_payment_proof, PaymentProofError, VerifiedPayment};

/// Pipeline stage labels, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceStep {
    Validating,
    VerifyingPayment,
    PublishingContent,
    FanningOut,
    StoringRecord,
    Attesting,
    Done,
}

impl IssuanceStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuanceStep::Validating => "validating",
            IssuanceStep::VerifyingPayment => "verifying_payment",
            IssuanceStep::PublishingContent => "publishing_content",
            IssuanceStep::FanningOut => "fanning_out",
            IssuanceStep::StoringRecord => "storing_record",
            IssuanceStep::Attesting => "attesting",
            IssuanceStep::Done => "done",
        }
    }
}

impl fmt::Display for IssuanceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage together with what it works on.
enum Stage {
    Validating,
    VerifyingPayment(BadgeContent),
    PublishingContent { content: BadgeContent, paid: bool },
    FanningOut(Badge),
    StoringRecord(Badge),
    Attesting(Badge),
    Done(Badge),
}

impl Stage {
    fn step(&self) -> IssuanceStep {
        match self {
            Stage::Validating => IssuanceStep::Validating,
            Stage::VerifyingPayment(_) => IssuanceStep::VerifyingPayment,
            Stage::PublishingContent { .. } => IssuanceStep::PublishingContent,
            Stage::FanningOut(_) => IssuanceStep::FanningOut,
            Stage::StoringRecord(_) => IssuanceStep::StoringRecord,
            Stage::Attesting(_) => IssuanceStep::Attesting,
            Stage::Done(_) => IssuanceStep::Done,
        }
    }
}

/// Badge issuance orchestrator.
pub struct BadgeIssuer<'a> {
    documents: &'a dyn DocumentStore,
    content: &'a dyn ContentStore,
    chain: &'a dyn ChainClient,
    signer: &'a dyn RemoteSigner,
    cfg: &'a IssuanceConfig,
}

impl<'a> BadgeIssuer<'a> {
    pub fn new(
        documents: &'a dyn DocumentStore,
        content: &'a dyn ContentStore,
        chain: &'a dyn ChainClient,
        signer: &'a dyn RemoteSigner,
        cfg: &'a IssuanceConfig,
    ) -> Self {
        Self {
            documents,
            content,
            chain,
            signer,
            cfg,
        }
    }

    /// Issue a badge on behalf of `caller`. `now_ms` is the creation time in
    /// epoch milliseconds.
    pub async fn create_badge(
        &self,
        caller: &str,
        req: &CreateBadgeRequest,
        now_ms: i64,
    ) -> Result<Badge, IssuanceError> {
        let mut stage = Stage::Validating;
        loop {
            let step = stage.step();
            tracing::debug!(stage = %step, caller = %caller, "Issuance stage");

            stage = match stage {
                Stage::Validating => {
                    let content = validate_badge_request(caller, req, self.cfg, now_ms)?;
                    if self.cfg.requires_payment(content.recipients.len()) {
                        Stage::VerifyingPayment(content)
                    } else {
                        Stage::PublishingContent {
                            content,
                            paid: false,
                        }
                    }
                }
                Stage::VerifyingPayment(content) => {
                    self.settle_payment(req, &content).await?;
                    Stage::PublishingContent {
                        content,
                        paid: true,
                    }
                }
                Stage::PublishingContent { content, paid } => {
                    let id = self.publish(&content, paid).await?;
                    Stage::FanningOut(Badge {
                        id,
                        content,
                        date_accepted: None,
                    })
                }
                Stage::FanningOut(badge) => {
                    self.fan_out(&badge).await?;
                    Stage::StoringRecord(badge)
                }
                Stage::StoringRecord(badge) => {
                    self.store(&badge).await?;
                    Stage::Attesting(badge)
                }
                Stage::Attesting(badge) => {
                    self.attest(&badge).await?;
                    Stage::Done(badge)
                }
                Stage::Done(badge) => {
                    tracing::info!(
                        badge_id = %badge.id,
                        issuer = %badge.content.issuer,
                        recipients = badge.content.recipients.len(),
                        "Badge issued"
                    );
                    return Ok(badge);
                }
            };
        }
    }

    async fn settle_payment(
        &self,
        req: &CreateBadgeRequest,
        content: &BadgeContent,
    ) -> Result<(), IssuanceError> {
        let payment = verify_payment_proof(
            req.signed_transaction_hex.as_deref(),
            req.amount_nanos,
            content.recipients.len(),
            self.cfg,
        )?;

        self.chain
            .submit_transaction(&payment.signed_transaction_hex)
            .await
            .map_err(|e| {
                tracing::warn!(issuer = %content.issuer, error = %e, "Payment was not settled");
                IssuanceError::PaymentNotSettled(e)
            })?;

        tracing::info!(
            issuer = %content.issuer,
            amount_nanos = payment.amount_nanos,
            "Payment settled"
        );
        Ok(())
    }

    async fn publish(&self, content: &BadgeContent, paid: bool) -> Result<String, IssuanceError> {
        let published = match canonical_json(content) {
            Ok(bytes) => self.content.add(bytes).await,
            Err(e) => Err(e),
        };
        let e: ContentError = match published {
            Ok(id) => return Ok(id),
            Err(e) => e,
        };

        if !paid {
            tracing::warn!(issuer = %content.issuer, error = %e, "Content publication failed");
            return Err(IssuanceError::PublishFailed(e));
        }

        tracing::error!(
            issuer = %content.issuer,
            recipients = ?content.recipients,
            error = %e,
            "Payment settled but content publication failed"
        );
        let event = ReconciliationEvent::new(
            ReconciliationKind::PublishAfterPayment,
            &content.issuer,
            &content.recipients,
        )
        .with_reason(e.to_string());
        self.record(event).await;

        Err(IssuanceError::PublishFailedAfterPayment(e))
    }

    async fn fan_out(&self, badge: &Badge) -> Result<(), IssuanceError> {
        let users = UserRepository::new(self.documents);
        let content = &badge.content;

        if let Err(FanoutFailure { failed, reason }) =
            fan_out(&users, &badge.id, &content.issuer, &content.recipients).await
        {
            tracing::error!(
                badge_id = %badge.id,
                issuer = %content.issuer,
                recipients = ?content.recipients,
                failed = ?failed,
                reason = %reason,
                "Recipient fan-out partially failed"
            );
            let event = ReconciliationEvent::new(
                ReconciliationKind::PartialFanout,
                &content.issuer,
                &content.recipients,
            )
            .with_badge(&badge.id)
            .with_failed(failed.clone())
            .with_reason(&reason);
            self.record(event).await;

            return Err(IssuanceError::PartialFanout {
                badge_id: badge.id.clone(),
                issuer: content.issuer.clone(),
                recipients: content.recipients.clone(),
                failed,
                reason,
            });
        }
        Ok(())
    }

    async fn store(&self, badge: &Badge) -> Result<(), IssuanceError> {
        let content = &badge.content;
        if let Err(e) = BadgeRepository::new(self.documents).store(badge).await {
            tracing::error!(
                badge_id = %badge.id,
                issuer = %content.issuer,
                recipients = ?content.recipients,
                error = %e,
                "Badge record was not stored after fan-out"
            );
            let event = ReconciliationEvent::new(
                ReconciliationKind::PartialStore,
                &content.issuer,
                &content.recipients,
            )
            .with_badge(&badge.id)
            .with_reason(e.to_string());
            self.record(event).await;

            return Err(IssuanceError::PartialStore {
                badge_id: badge.id.clone(),
                issuer: content.issuer.clone(),
                recipients: content.recipients.clone(),
                source: e,
            });
        }
        Ok(())
    }

    async fn attest(&self, badge: &Badge) -> Result<(), IssuanceError> {
        let poster = AttestationPoster::new(self.chain, self.signer, self.cfg);
        if let Err(e) = poster.post(&badge.id).await {
            let content = &badge.content;
            tracing::error!(
                badge_id = %badge.id,
                issuer = %content.issuer,
                recipients = ?content.recipients,
                error = %e,
                "Badge issued but attestation failed"
            );
            let event = ReconciliationEvent::new(
                ReconciliationKind::Attestation,
                &content.issuer,
                &content.recipients,
            )
            .with_badge(&badge.id)
            .with_reason(e.to_string());
            self.record(event).await;

            return Err(IssuanceError::AttestationFailed {
                badge_id: badge.id.clone(),
                source: e,
            });
        }
        Ok(())
    }

    /// Write a reconciliation event; a failure here is only logged.
    async fn record(&self, event: ReconciliationEvent) {
        if let Err(e) = ReconciliationLog::new(self.documents).log(&event).await {
            tracing::error!(
                kind = ?event.kind,
                badge_id = ?event.badge_id,
                issuer = %event.issuer,
                error = %e,
                "Failed to write reconciliation event"
            );
        }
    }
}
