// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::identity::verify_identity;
use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Header carrying the caller's base58check account key.
pub const PUBLIC_KEY_HEADER: &str = "x-public-key";

/// Extractor for authenticated users.
///
/// Verifies the bearer token against the key in `X-Public-Key`. The caller's
/// user record is created on first sight, so every authenticated handler can
/// assume `users/{identity}` exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_user(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<UserDetails>, ApiError> {
///     // user.public_key is the caller's identity
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;

        let public_key = parts
            .headers
            .get(PUBLIC_KEY_HEADER)
            .ok_or(AuthError::MissingPublicKey)?
            .to_str()
            .map_err(|_| AuthError::InvalidPublicKey)?
            .trim()
            .to_string();

        let claims = verify_identity(&public_key, token, chrono::Utc::now().timestamp())?;
        let user = AuthenticatedUser::from_claims(
            public_key,
            &claims,
            &state.auth_config.admin_public_keys,
        );

        state
            .ctx
            .users()
            .get_or_create(user.id())
            .await
            .map_err(|e| AuthError::InternalError(format!("failed to load user record: {e}")))?;

        tracing::debug!(identity = %user.id(), role = ?user.role, "Authenticated request");
        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::testing::{account_key, identity_token, other_account_key, test_state};
    use axum::http::Request;

    fn parts_with(headers: &[(&str, String)]) -> Parts {
        let mut builder = Request::builder().uri("/test");
        for (name, value) in headers {
            builder = builder.header(*name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn signed_headers(public_key: &str, key: &k256::ecdsa::SigningKey) -> Vec<(&'static str, String)> {
        let exp = chrono::Utc::now().timestamp() + 600;
        vec![
            ("Authorization", format!("Bearer {}", identity_token(key, Some(exp)))),
            ("X-Public-Key", public_key.to_string()),
        ]
    }

    #[tokio::test]
    async fn requires_auth_header() {
        let (_dir, state, _) = test_state();
        let mut parts = parts_with(&[]);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn requires_public_key_header() {
        let (_dir, state, _) = test_state();
        let (_, key) = account_key();
        let token = identity_token(&key, None);
        let mut parts = parts_with(&[("Authorization", format!("Bearer {token}"))]);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingPublicKey)));
    }

    #[tokio::test]
    async fn rejects_non_bearer_scheme() {
        let (_dir, state, _) = test_state();
        let (public_key, _) = account_key();
        let mut parts = parts_with(&[
            ("Authorization", "Basic abc".to_string()),
            ("X-Public-Key", public_key),
        ]);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn valid_token_creates_user_record() {
        let (_dir, state, _) = test_state();
        let (public_key, key) = account_key();
        let mut parts = parts_with(&signed_headers(&public_key, &key));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.id(), public_key);
        assert_eq!(user.role, Role::Member);

        let record = state.ctx.users().get(&public_key).await.unwrap();
        assert_eq!(record, Some(Default::default()));
        assert!(parts.extensions.get::<AuthenticatedUser>().is_some());
    }

    #[tokio::test]
    async fn token_from_another_key_is_rejected() {
        let (_dir, state, _) = test_state();
        let (public_key, _) = account_key();
        let (_, other_key) = other_account_key();
        let mut parts = parts_with(&signed_headers(&public_key, &other_key));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
        assert!(state.ctx.users().get(&public_key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prefers_extensions() {
        let (_dir, state, _) = test_state();
        let mut parts = parts_with(&[]);
        parts.extensions.insert(AuthenticatedUser {
            public_key: "BC1preset".to_string(),
            role: Role::Admin,
            expires_at: None,
        });

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.id(), "BC1preset");
    }

    #[tokio::test]
    async fn admin_only_checks_role() {
        let (_dir, state, _) = test_state();

        let (member, key) = account_key();
        let mut parts = parts_with(&signed_headers(&member, &key));
        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));

        let (admin, key) = other_account_key();
        let mut parts = parts_with(&signed_headers(&admin, &key));
        let AdminOnly(user) = AdminOnly::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(user.is_admin());
    }
}
