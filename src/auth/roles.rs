// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller roles.
///
/// - `Admin` - operators listed in `ADMIN_PUBLIC_KEYS`; may read the
///   reconciliation log
/// - `Member` - every other verified identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        matches!((self, required), (Role::Admin, _) | (Role::Member, Role::Member))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Member => write!(f, "member"),
        }
    }
}
