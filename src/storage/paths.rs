// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Document key layout.
//!
//! ```text
//! users/{identity}
//! users/{identity}/collections/{name}
//! badges/{content_id}
//! badgePages/{page_id}
//! deadLetters/{millis}-{event_id}
//! ```

use std::fmt;

use super::document::DocumentError;

pub const USERS: &str = "users";
pub const BADGES: &str = "badges";
pub const BADGE_PAGES: &str = "badgePages";
pub const DEAD_LETTERS: &str = "deadLetters";
const COLLECTIONS: &str = "collections";

/// A validated document key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

impl DocPath {
    /// Key for a document directly inside `collection`.
    pub fn new(collection: &str, id: &str) -> Result<Self, DocumentError> {
        check_segment(id)?;
        Ok(Self(format!("{collection}/{id}")))
    }

    pub fn user(identity: &str) -> Result<Self, DocumentError> {
        Self::new(USERS, identity)
    }

    pub fn badge(id: &str) -> Result<Self, DocumentError> {
        Self::new(BADGES, id)
    }

    pub fn badge_page(id: &str) -> Result<Self, DocumentError> {
        Self::new(BADGE_PAGES, id)
    }

    pub fn dead_letter(id: &str) -> Result<Self, DocumentError> {
        Self::new(DEAD_LETTERS, id)
    }

    /// Key for a named collection owned by a user.
    pub fn user_collection(identity: &str, name: &str) -> Result<Self, DocumentError> {
        Self::new(&user_collections(identity)?, name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collection path of a user's badge collections.
pub fn user_collections(identity: &str) -> Result<String, DocumentError> {
    check_segment(identity)?;
    Ok(format!("{USERS}/{identity}/{COLLECTIONS}"))
}

/// Whether `segment` can be used as one component of a document key.
pub fn is_valid_segment(segment: &str) -> bool {
    !(segment.is_empty() || segment == "." || segment == ".." || segment.contains('/'))
}

fn check_segment(segment: &str) -> Result<(), DocumentError> {
    if !is_valid_segment(segment) {
        return Err(DocumentError::InvalidKey(segment.to_string()));
    }
    Ok(())
}
