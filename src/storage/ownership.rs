// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership checks for caller-owned resources.

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Identity of the owner.
    fn owner_id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipError {
    #[error("{user} does not own this {resource}")]
    NotOwner { user: String, resource: &'static str },

    #[error("{resource} not found")]
    NotFound { resource: &'static str },
}

impl From<OwnershipError> for ApiError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::NotOwner { .. } => ApiError::forbidden(err.to_string()),
            OwnershipError::NotFound { .. } => ApiError::not_found(err.to_string()),
        }
    }
}

/// Trait for enforcing ownership.
pub trait OwnershipEnforcer {
    fn verify_ownership(
        &self,
        user: &AuthenticatedUser,
        resource: &'static str,
    ) -> Result<(), OwnershipError>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(
        &self,
        user: &AuthenticatedUser,
        resource: &'static str,
    ) -> Result<(), OwnershipError> {
        if self.owner_id() == user.id() {
            Ok(())
        } else {
            Err(OwnershipError::NotOwner {
                user: user.id().to_string(),
                resource,
            })
        }
    }
}

/// Extension trait for checking ownership of a lookup result.
pub trait OwnershipCheck<T> {
    /// Verify ownership and return the resource if authorized.
    fn verify_owner(
        self,
        user: &AuthenticatedUser,
        resource: &'static str,
    ) -> Result<T, OwnershipError>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn verify_owner(
        self,
        user: &AuthenticatedUser,
        resource: &'static str,
    ) -> Result<T, OwnershipError> {
        let found = self.ok_or(OwnershipError::NotFound { resource })?;
        found.verify_ownership(user, resource)?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use axum::http::StatusCode;

    struct TestResource {
        owner: String,
    }

    impl OwnedResource for TestResource {
        fn owner_id(&self) -> &str {
            &self.owner
        }
    }

    fn make_user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            public_key: id.to_string(),
            role: Role::Member,
            expires_at: None,
        }
    }

    #[test]
    fn owner_can_access() {
        let resource = TestResource {
            owner: "alice".into(),
        };
        assert!(resource.verify_ownership(&make_user("alice"), "page").is_ok());
    }

    #[test]
    fn non_owner_is_denied() {
        let resource = TestResource {
            owner: "alice".into(),
        };
        let err = resource
            .verify_ownership(&make_user("bob"), "page")
            .unwrap_err();
        assert_eq!(ApiError::from(err).status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_resource_is_not_found() {
        let missing: Option<TestResource> = None;
        let err = missing.verify_owner(&make_user("alice"), "page").err().unwrap();
        assert_eq!(err, OwnershipError::NotFound { resource: "page" });
        assert_eq!(ApiError::from(err).status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn present_resource_is_returned() {
        let found = Some(TestResource {
            owner: "alice".into(),
        });
        let resource = found.verify_owner(&make_user("alice"), "page").unwrap();
        assert_eq!(resource.owner, "alice");
    }
}
