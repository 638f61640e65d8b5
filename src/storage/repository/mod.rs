// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer over the document store.
//!
//! Each repository borrows a [`DocumentStore`](super::DocumentStore) and maps
//! typed models to documents. Repositories hold no state of their own, so
//! handlers build them per request.

pub mod badges;
pub mod collections;
pub mod pages;
pub mod users;

pub use badges::BadgeRepository;
pub use collections::{CollectionRepository, Snapshot};
pub use pages::BadgePageRepository;
pub use users::UserRepository;
