// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Badge record repository.
//!
//! Badge records are keyed by their content identifier and never rewritten
//! after publication; `dateAccepted` is the only field mutated afterwards.

use futures::future::join_all;

use crate::models::Badge;
use crate::storage::document::{
    from_document, to_document, DocumentResult, DocumentStore, FieldOp,
};
use crate::storage::paths::DocPath;
use crate::validation::dedupe_ids;

const DATE_ACCEPTED: &str = "dateAccepted";

/// Repository for badge records.
pub struct BadgeRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> BadgeRepository<'a> {
    /// Create a new BadgeRepository.
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a badge by content identifier.
    pub async fn get(&self, id: &str) -> DocumentResult<Option<Badge>> {
        let path = DocPath::badge(id)?;
        match self.store.get(&path).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Get several badges concurrently.
    ///
    /// Duplicate ids are read once and absent ids are skipped; the result
    /// follows the order of first occurrence.
    pub async fn get_many(&self, ids: &[String]) -> DocumentResult<Vec<Badge>> {
        let ids = dedupe_ids(ids);
        let reads = join_all(ids.iter().map(|id| self.get(id))).await;

        let mut badges = Vec::with_capacity(reads.len());
        for read in reads {
            if let Some(badge) = read? {
                badges.push(badge);
            }
        }
        Ok(badges)
    }

    /// Persist a finalized badge record.
    pub async fn store(&self, badge: &Badge) -> DocumentResult<()> {
        let path = DocPath::badge(&badge.id)?;
        let doc = to_document(&path, badge)?;
        self.store.set(&path, doc).await
    }

    /// Stamp the acceptance time (epoch millis).
    pub async fn set_date_accepted(&self, id: &str, accepted_at: i64) -> DocumentResult<()> {
        let path = DocPath::badge(id)?;
        self.store
            .update(&path, vec![FieldOp::set(DATE_ACCEPTED, accepted_at)], None)
            .await
    }

    /// Remove the acceptance time.
    pub async fn clear_date_accepted(&self, id: &str) -> DocumentResult<()> {
        let path = DocPath::badge(id)?;
        self.store
            .update(&path, vec![FieldOp::delete(DATE_ACCEPTED)], None)
            .await
    }
}
