// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory content store.
//!
//! Identifiers are base58 SHA-256 multihashes (`Qm...`, the CIDv0 text
//! form) of the raw bytes.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{ContentError, ContentStore};

/// Multihash prefix: sha2-256, 32-byte digest.
const SHA256_MULTIHASH_PREFIX: [u8; 2] = [0x12, 0x20];

/// Content identifier of `bytes`.
pub fn content_id(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut multihash = Vec::with_capacity(SHA256_MULTIHASH_PREFIX.len() + digest.len());
    multihash.extend_from_slice(&SHA256_MULTIHASH_PREFIX);
    multihash.extend_from_slice(&digest);
    bs58::encode(multihash).into_string()
}

#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch previously added content.
    pub fn get(&self, id: &str) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .ok()
            .and_then(|blobs| blobs.get(id).cloned())
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn add(&self, bytes: Vec<u8>) -> Result<String, ContentError> {
        let id = content_id(&bytes);
        self.blobs
            .write()
            .map_err(|_| ContentError::Request("content store lock poisoned".to_string()))?
            .insert(id.clone(), bytes);
        Ok(id)
    }
}
