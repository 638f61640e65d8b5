// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Badge Issuance Server
//!
//! Issues content-addressed badges to sets of recipients, keeps per-user
//! badge and collection records in an embedded document store and attests
//! each issuance with a signed post on the chain.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Identity token verification
//! - `chain` - Chain HTTP API and remote signer clients
//! - `content` - Content-addressed publishing (IPFS)
//! - `issuance` - The badge issuance pipeline
//! - `storage` - Document store (redb) and typed repositories
//! - `validation` - Request field rules

pub mod api;
pub mod auth;
pub mod chain;
pub mod config;
pub mod content;
pub mod error;
pub mod issuance;
pub mod models;
pub mod state;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub mod testing;
