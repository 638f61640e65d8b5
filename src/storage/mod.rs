// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state lives in a keyed JSON document store backed by an
//! embedded redb database under `DATA_DIR`.
//!
//! ## Storage Layout
//!
//! ```text
//! users/{identity}                     # badge and collection sets
//! users/{identity}/collections/{name}  # badge collections
//! badges/{contentId}                   # published badges
//! badgePages/{uuid}                    # badge listings
//! deadLetters/{millis}-{uuid}          # reconciliation events
//! ```
//!
//! ## Important Notes
//!
//! - Each write touches exactly one document and is atomic
//! - There are no multi-document transactions
//! - Handlers go through the repositories, never raw documents

pub mod database;
pub mod document;
pub mod ownership;
pub mod paths;
pub mod reconciliation;
pub mod repository;

pub use database::RedbDocumentStore;
pub use document::{
    Document, DocumentError, DocumentResult, DocumentStore, FieldOp, Filter, Precondition,
};
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipEnforcer, OwnershipError};
pub use paths::DocPath;
pub use reconciliation::{ReconciliationEvent, ReconciliationKind, ReconciliationLog};
pub use repository::{
    BadgePageRepository, BadgeRepository, CollectionRepository, Snapshot, UserRepository,
};
