// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Content Store
//!
//! Immutable content-addressed storage for published badges.
//!
//! - [`IpfsContentStore`]: IPFS HTTP API (`/api/v0/add`)
//! - [`MemoryContentStore`]: in-process store for development and tests

pub mod ipfs;
pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

pub use ipfs::IpfsContentStore;
pub use memory::MemoryContentStore;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content store request failed: {0}")]
    Request(String),

    #[error("content store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("content store response was invalid: {0}")]
    InvalidResponse(String),

    #[error("failed to encode content: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Content-addressed store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `bytes` and return their content identifier.
    async fn add(&self, bytes: Vec<u8>) -> Result<String, ContentError>;
}

/// Compact JSON in declaration order of `T`'s fields.
///
/// Equal values always encode to equal bytes, so publishing the same content
/// twice yields the same identifier.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ContentError> {
    Ok(serde_json::to_vec(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        title: &'static str,
        image_url: &'static str,
        count: u32,
    }

    #[test]
    fn canonical_json_is_compact_and_ordered() {
        let bytes = canonical_json(&Sample {
            title: "Intro",
            image_url: "x",
            count: 2,
        })
        .unwrap();
        assert_eq!(bytes, br#"{"title":"Intro","imageUrl":"x","count":2}"#);
    }
}
