// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reconciliation log for issuance failures that left durable side effects.
//!
//! Events land in the `deadLetters` collection keyed by a zero-padded
//! millisecond timestamp, so a key-ordered scan returns them chronologically.
//! Operators read them through the admin endpoint and repair state by hand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::document::{from_document, to_document, DocumentResult, DocumentStore};
use super::paths::{DocPath, DEAD_LETTERS};

/// What went wrong.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationKind {
    /// Payment settled but content publication failed.
    PublishAfterPayment,
    /// Some user records missed the new badge.
    PartialFanout,
    /// User records were updated but the badge record was not stored.
    PartialStore,
    /// Issuance is durable but the public attestation is missing.
    Attestation,
}

/// A reconciliation log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ReconciliationEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: ReconciliationKind,
    /// Content identifier, when the badge was published.
    pub badge_id: Option<String>,
    pub issuer: String,
    pub recipients: Vec<String>,
    /// Identities whose user-record writes failed.
    #[serde(default)]
    pub failed_identities: Vec<String>,
    pub reason: String,
}

impl ReconciliationEvent {
    /// Create a new event.
    pub fn new(kind: ReconciliationKind, issuer: &str, recipients: &[String]) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            badge_id: None,
            issuer: issuer.to_string(),
            recipients: recipients.to_vec(),
            failed_identities: Vec::new(),
            reason: String::new(),
        }
    }

    pub fn with_badge(mut self, badge_id: impl Into<String>) -> Self {
        self.badge_id = Some(badge_id.into());
        self
    }

    pub fn with_failed(mut self, identities: Vec<String>) -> Self {
        self.failed_identities = identities;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    fn key(&self) -> String {
        format!(
            "{:013}-{}",
            self.timestamp.timestamp_millis().max(0),
            self.event_id
        )
    }
}

/// Reconciliation log over the document store.
pub struct ReconciliationLog<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ReconciliationLog<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Persist an event.
    pub async fn log(&self, event: &ReconciliationEvent) -> DocumentResult<()> {
        let path = DocPath::dead_letter(&event.key())?;
        let doc = to_document(&path, event)?;
        self.store.create(&path, doc).await
    }

    /// All events, oldest first.
    pub async fn list(&self) -> DocumentResult<Vec<ReconciliationEvent>> {
        self.store
            .query(DEAD_LETTERS, None)
            .await?
            .into_iter()
            .map(|(_, doc)| from_document(doc))
            .collect()
    }
}
