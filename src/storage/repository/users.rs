// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! User records live under `users/{identity}` and are created lazily from
//! the blank template the first time an identity is referenced. Every set
//! mutation is a single field-level update, so concurrent requests touching
//! the same user never lose each other's writes.

use serde_json::Value;

use crate::models::{user_fields as f, UserDetails};
use crate::storage::document::{
    from_document, to_document, DocumentError, DocumentResult, DocumentStore, FieldOp,
    Precondition,
};
use crate::storage::paths::DocPath;

/// Repository for user records.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a user record if it exists.
    pub async fn get(&self, identity: &str) -> DocumentResult<Option<UserDetails>> {
        let path = DocPath::user(identity)?;
        match self.store.get(&path).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Get a user record, creating the blank template if absent.
    pub async fn get_or_create(&self, identity: &str) -> DocumentResult<UserDetails> {
        if let Some(user) = self.get(identity).await? {
            return Ok(user);
        }

        let blank = UserDetails::default();
        match self.create(identity, &blank).await {
            Ok(()) => {
                tracing::debug!(identity = %identity, "Created user record");
                Ok(blank)
            }
            Err(DocumentError::AlreadyExists(_)) => {
                let path = DocPath::user(identity)?;
                let doc = self
                    .store
                    .get(&path)
                    .await?
                    .ok_or_else(|| DocumentError::NotFound(path.to_string()))?;
                from_document(doc)
            }
            Err(e) => Err(e),
        }
    }

    /// Insert a user record; fails with `AlreadyExists` if present.
    pub async fn create(&self, identity: &str, user: &UserDetails) -> DocumentResult<()> {
        let path = DocPath::user(identity)?;
        let doc = to_document(&path, user)?;
        self.store.create(&path, doc).await
    }

    async fn update(
        &self,
        identity: &str,
        ops: Vec<FieldOp>,
        precondition: Option<Precondition>,
    ) -> DocumentResult<()> {
        let path = DocPath::user(identity)?;
        self.store.update(&path, ops, precondition).await
    }

    /// Record a received badge as pending on an existing user.
    pub async fn add_received(&self, identity: &str, badge_id: &str) -> DocumentResult<()> {
        self.update(
            identity,
            vec![
                FieldOp::union(f::BADGES_RECEIVED, badge_id),
                FieldOp::union(f::BADGES_PENDING, badge_id),
            ],
            None,
        )
        .await
    }

    /// Create a recipient that has no record yet, holding only `badge_id`.
    ///
    /// Falls back to [`add_received`](Self::add_received) if another request
    /// created the record in the meantime.
    pub async fn create_recipient(&self, identity: &str, badge_id: &str) -> DocumentResult<()> {
        let user = UserDetails {
            badges_received: vec![badge_id.to_string()],
            badges_pending: vec![badge_id.to_string()],
            ..Default::default()
        };
        match self.create(identity, &user).await {
            Err(DocumentError::AlreadyExists(_)) => self.add_received(identity, badge_id).await,
            other => other,
        }
    }

    /// Record an issued badge, creating the issuer's record if absent.
    pub async fn add_issued(&self, identity: &str, badge_id: &str) -> DocumentResult<()> {
        let op = || vec![FieldOp::union(f::BADGES_ISSUED, badge_id)];
        match self.update(identity, op(), None).await {
            Err(DocumentError::NotFound(_)) => {
                let user = UserDetails {
                    badges_issued: vec![badge_id.to_string()],
                    ..Default::default()
                };
                match self.create(identity, &user).await {
                    Err(DocumentError::AlreadyExists(_)) => self.update(identity, op(), None).await,
                    other => other,
                }
            }
            other => other,
        }
    }

    /// Move a badge from pending to accepted.
    ///
    /// Fails with `PreconditionFailed` and leaves the record untouched if the
    /// badge is not pending.
    pub async fn accept_pending(&self, identity: &str, badge_id: &str) -> DocumentResult<()> {
        self.update(
            identity,
            vec![
                FieldOp::remove(f::BADGES_PENDING, badge_id),
                FieldOp::union(f::BADGES_ACCEPTED, badge_id),
            ],
            Some(Precondition::array_contains(f::BADGES_PENDING, badge_id)),
        )
        .await
    }

    /// Drop a pending badge.
    pub async fn decline_pending(&self, identity: &str, badge_id: &str) -> DocumentResult<()> {
        self.update(
            identity,
            vec![FieldOp::remove(f::BADGES_PENDING, badge_id)],
            Some(Precondition::array_contains(f::BADGES_PENDING, badge_id)),
        )
        .await
    }

    /// Drop an accepted badge from the user's accepted list.
    pub async fn hide_accepted(&self, identity: &str, badge_id: &str) -> DocumentResult<()> {
        self.update(
            identity,
            vec![FieldOp::remove(f::BADGES_ACCEPTED, badge_id)],
            Some(Precondition::array_contains(f::BADGES_ACCEPTED, badge_id)),
        )
        .await
    }

    /// Move an issued badge to `badgesRemovedFromIssued`.
    pub async fn hide_issued(&self, identity: &str, badge_id: &str) -> DocumentResult<()> {
        self.update(
            identity,
            vec![
                FieldOp::remove(f::BADGES_ISSUED, badge_id),
                FieldOp::union(f::BADGES_REMOVED_FROM_ISSUED, badge_id),
            ],
            Some(Precondition::array_contains(f::BADGES_ISSUED, badge_id)),
        )
        .await
    }

    pub async fn add_listed(&self, identity: &str, page_id: &str) -> DocumentResult<()> {
        self.update(identity, vec![FieldOp::union(f::BADGES_LISTED, page_id)], None)
            .await
    }

    pub async fn remove_listed(&self, identity: &str, page_id: &str) -> DocumentResult<()> {
        self.update(identity, vec![FieldOp::remove(f::BADGES_LISTED, page_id)], None)
            .await
    }

    /// Register a collection name under the received or issued list.
    pub async fn add_collection(
        &self,
        identity: &str,
        name: &str,
        received: bool,
    ) -> DocumentResult<()> {
        let field = if received {
            f::RECEIVED_COLLECTIONS
        } else {
            f::ISSUED_COLLECTIONS
        };
        self.update(identity, vec![FieldOp::union(field, name)], None)
            .await
    }

    /// Remove a collection name from both lists.
    pub async fn remove_collection(&self, identity: &str, name: &str) -> DocumentResult<()> {
        let name = Value::from(name);
        self.update(
            identity,
            vec![
                FieldOp::ArrayRemove(f::RECEIVED_COLLECTIONS.to_string(), vec![name.clone()]),
                FieldOp::ArrayRemove(f::ISSUED_COLLECTIONS.to_string(), vec![name]),
            ],
            None,
        )
        .await
    }
}
