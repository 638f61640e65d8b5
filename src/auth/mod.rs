// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Identity verification for the badge API.
//!
//! ## Auth Flow
//!
//! 1. The client's wallet signs a short-lived JWT with the account key
//! 2. The client sends `Authorization: Bearer <jwt>` and `X-Public-Key: <key>`
//! 3. The server:
//!    - Decodes the base58check key into a secp256k1 point
//!    - Verifies the token signature and expiry against that key
//!    - Uses the key string as the caller's identity
//!    - Creates the caller's user record if it does not exist yet
//!
//! ## Security
//!
//! - Mutating routes require authentication; reads and health are public
//! - Admin routes require a key listed in `ADMIN_PUBLIC_KEYS`
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod roles;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, PUBLIC_KEY_HEADER};
pub use roles::Role;
