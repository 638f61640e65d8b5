// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Badge collection repository.
//!
//! Collections are stored in the owner's `collections` sub-collection and
//! keyed by name. `issuers` and `recipients` are snapshots taken from the
//! member badges when they are added.

use serde_json::Value;

use crate::models::{collection_fields as f, Badge, BadgeCollection};
use crate::storage::document::{
    from_document, to_document, DocumentResult, DocumentStore, FieldOp,
};
use crate::storage::paths::{user_collections, DocPath};

/// Issuers and recipients of a set of badges, de-duplicated in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub issuers: Vec<String>,
    pub recipients: Vec<String>,
}

impl Snapshot {
    pub fn of(badges: &[Badge]) -> Self {
        let mut snapshot = Snapshot::default();
        for badge in badges {
            push_unique(&mut snapshot.issuers, &badge.content.issuer);
            for recipient in &badge.content.recipients {
                push_unique(&mut snapshot.recipients, recipient);
            }
        }
        snapshot
    }
}

fn push_unique(items: &mut Vec<String>, value: &str) {
    if !items.iter().any(|item| item == value) {
        items.push(value.to_string());
    }
}

fn strings(values: &[String]) -> Vec<Value> {
    values.iter().map(|v| Value::from(v.as_str())).collect()
}

/// Repository for a user's badge collections.
pub struct CollectionRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CollectionRepository<'a> {
    /// Create a new CollectionRepository.
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    pub async fn get(&self, owner: &str, name: &str) -> DocumentResult<Option<BadgeCollection>> {
        let path = DocPath::user_collection(owner, name)?;
        match self.store.get(&path).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// All collections of `owner`, ordered by name.
    pub async fn list(&self, owner: &str) -> DocumentResult<Vec<BadgeCollection>> {
        let collection = user_collections(owner)?;
        self.store
            .query(&collection, None)
            .await?
            .into_iter()
            .map(|(_, doc)| from_document(doc))
            .collect()
    }

    /// Write a collection, replacing any existing one with the same name.
    pub async fn save(&self, owner: &str, collection: &BadgeCollection) -> DocumentResult<()> {
        let path = DocPath::user_collection(owner, &collection.name)?;
        let doc = to_document(&path, collection)?;
        self.store.set(&path, doc).await
    }

    pub async fn delete(&self, owner: &str, name: &str) -> DocumentResult<()> {
        let path = DocPath::user_collection(owner, name)?;
        self.store.delete(&path).await
    }

    /// Union badge ids and their snapshot into an existing collection.
    pub async fn add_badges(
        &self,
        owner: &str,
        name: &str,
        badge_ids: &[String],
        snapshot: &Snapshot,
    ) -> DocumentResult<()> {
        let path = DocPath::user_collection(owner, name)?;
        self.store
            .update(
                &path,
                vec![
                    FieldOp::ArrayUnion(f::BADGES.to_string(), strings(badge_ids)),
                    FieldOp::ArrayUnion(f::ISSUERS.to_string(), strings(&snapshot.issuers)),
                    FieldOp::ArrayUnion(f::RECIPIENTS.to_string(), strings(&snapshot.recipients)),
                ],
                None,
            )
            .await
    }

    /// Overwrite the member list and its snapshot.
    pub async fn replace_badges(
        &self,
        owner: &str,
        name: &str,
        badge_ids: &[String],
        snapshot: &Snapshot,
    ) -> DocumentResult<()> {
        let path = DocPath::user_collection(owner, name)?;
        self.store
            .update(
                &path,
                vec![
                    FieldOp::set(f::BADGES, strings(badge_ids)),
                    FieldOp::set(f::ISSUERS, strings(&snapshot.issuers)),
                    FieldOp::set(f::RECIPIENTS, strings(&snapshot.recipients)),
                ],
                None,
            )
            .await
    }
}
