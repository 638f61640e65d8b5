// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims read from an identity JWT.
///
/// Identity tokens are minted by the user's wallet and signed with the
/// account key; the identity itself comes from the public key header, so
/// only the timing claims matter here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityClaims {
    /// Expiration timestamp (seconds). Tokens without one do not expire.
    #[serde(default)]
    pub exp: Option<i64>,

    /// Issued at timestamp (seconds)
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Authenticated caller information.
///
/// This is the primary type used throughout the application to represent
/// the identity making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Base58check public key of the caller; the canonical identity string
    pub public_key: String,

    /// Caller's role
    pub role: Role,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: Option<i64>,
}

impl AuthenticatedUser {
    /// Build from verified claims, granting `Admin` to listed identities.
    pub fn from_claims(public_key: String, claims: &IdentityClaims, admins: &[String]) -> Self {
        let role = if admins.iter().any(|admin| *admin == public_key) {
            Role::Admin
        } else {
            Role::Member
        };

        Self {
            public_key,
            role,
            expires_at: claims.exp,
        }
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.has_privilege(Role::Admin)
    }

    /// Identity string used as the user document key.
    pub fn id(&self) -> &str {
        &self.public_key
    }
}
