// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Badge page repository.

use crate::models::BadgePage;
use crate::storage::document::{
    from_document, to_document, DocumentResult, DocumentStore, Filter,
};
use crate::storage::ownership::OwnedResource;
use crate::storage::paths::{DocPath, BADGE_PAGES};

impl OwnedResource for BadgePage {
    fn owner_id(&self) -> &str {
        &self.issuer
    }
}

/// Repository for badge pages.
pub struct BadgePageRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> BadgePageRepository<'a> {
    /// Create a new BadgePageRepository.
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Store a page under its id, replacing any existing one.
    pub async fn save(&self, page: &BadgePage) -> DocumentResult<()> {
        let path = DocPath::badge_page(&page.id)?;
        let doc = to_document(&path, page)?;
        self.store.set(&path, doc).await
    }

    pub async fn get(&self, id: &str) -> DocumentResult<Option<BadgePage>> {
        let path = DocPath::badge_page(id)?;
        match self.store.get(&path).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// All pages listed by `issuer`, ordered by page id.
    pub async fn list_by_issuer(&self, issuer: &str) -> DocumentResult<Vec<BadgePage>> {
        self.store
            .query(BADGE_PAGES, Some(Filter::equals("issuer", issuer)))
            .await?
            .into_iter()
            .map(|(_, doc)| from_document(doc))
            .collect()
    }

    pub async fn delete(&self, id: &str) -> DocumentResult<()> {
        let path = DocPath::badge_page(id)?;
        self.store.delete(&path).await
    }
}
