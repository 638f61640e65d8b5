// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User records, pending-badge decisions and profile lookups.
//!
//! Accept, decline and hide are single guarded updates: the badge must be in
//! the expected list when the write is applied, otherwise nothing changes
//! and the caller gets a 400.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use super::now_ms;
use crate::{
    auth::Auth,
    chain::{ChainError, ProfileQuery},
    error::ApiError,
    models::{BadgeIdRequest, HodlersRequest, MessageResponse, UserDetails},
    state::AppState,
    storage::DocumentError,
};

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "User identity")),
    tag = "Users",
    responses((status = 200, body = UserDetails))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDetails>, ApiError> {
    let user = state.ctx.users().get_or_create(id.trim()).await?;
    Ok(Json(user))
}

fn badge_id(request: &BadgeIdRequest) -> Result<&str, ApiError> {
    let id = request.badge_id.trim();
    if id.is_empty() {
        return Err(
            ApiError::bad_request("Please enter a valid string for badgeId").with_code("MISSING_FIELD")
        );
    }
    Ok(id)
}

/// Map a failed list guard to a 400 naming the list.
fn not_in(list: &'static str, badge_id: &str) -> impl FnOnce(DocumentError) -> ApiError {
    let message = format!("{badge_id} not in {list} array");
    move |err| match err {
        DocumentError::PreconditionFailed { .. } => {
            ApiError::bad_request(message).with_code("BADGE_NOT_IN_LIST")
        }
        other => other.into(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/acceptBadge",
    request_body = BadgeIdRequest,
    tag = "Users",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Badge is not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn accept_badge(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<BadgeIdRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = badge_id(&request)?;
    state
        .ctx
        .users()
        .accept_pending(user.id(), id)
        .await
        .map_err(not_in("pending", id))?;

    match state.ctx.badges().set_date_accepted(id, now_ms()).await {
        Ok(()) => {}
        Err(DocumentError::NotFound(_)) => {
            tracing::warn!(badge_id = %id, identity = %user.id(), "Accepted badge has no record");
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(badge_id = %id, identity = %user.id(), "Badge accepted");
    Ok(Json(MessageResponse::new("Successfully accepted badge")))
}

#[utoipa::path(
    post,
    path = "/v1/declineBadge",
    request_body = BadgeIdRequest,
    tag = "Users",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Badge is not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn decline_badge(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<BadgeIdRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = badge_id(&request)?;
    state
        .ctx
        .users()
        .decline_pending(user.id(), id)
        .await
        .map_err(not_in("pending", id))?;

    Ok(Json(MessageResponse::new("Successfully declined badge")))
}

#[utoipa::path(
    post,
    path = "/v1/hideAcceptedBadge",
    request_body = BadgeIdRequest,
    tag = "Users",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Badge is not accepted")
    ),
    security(("bearer_auth" = []))
)]
pub async fn hide_accepted_badge(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<BadgeIdRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = badge_id(&request)?;
    state
        .ctx
        .users()
        .hide_accepted(user.id(), id)
        .await
        .map_err(not_in("accepted", id))?;

    match state.ctx.badges().clear_date_accepted(id).await {
        Ok(()) | Err(DocumentError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(Json(MessageResponse::new("Successfully removed badge")))
}

#[utoipa::path(
    post,
    path = "/v1/hideIssuedBadge",
    request_body = BadgeIdRequest,
    tag = "Users",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Badge was not issued by the caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn hide_issued_badge(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<BadgeIdRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = badge_id(&request)?;
    state
        .ctx
        .users()
        .hide_issued(user.id(), id)
        .await
        .map_err(not_in("issued", id))?;

    Ok(Json(MessageResponse::new("Successfully removed badge")))
}

fn upstream(message: String) -> impl FnOnce(ChainError) -> ApiError {
    move |err| {
        tracing::warn!(error = %err, "Chain API lookup failed");
        ApiError::bad_gateway(message).with_code("CHAIN_ERROR")
    }
}

#[utoipa::path(
    get,
    path = "/v1/username/{public_key}",
    params(("public_key" = String, Path, description = "Base58check public key")),
    tag = "Profiles",
    responses(
        (status = 200, description = "Raw chain profile response"),
        (status = 502, description = "Chain API failure")
    )
)]
pub async fn get_username(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let message = format!("Could not get username for public key: {public_key}");
    let profile = state
        .ctx
        .chain
        .get_profile(ProfileQuery::PublicKey(public_key))
        .await
        .map_err(upstream(message))?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/v1/publicKey/{user_name}",
    params(("user_name" = String, Path, description = "Profile username")),
    tag = "Profiles",
    responses(
        (status = 200, description = "Raw chain profile response"),
        (status = 502, description = "Chain API failure")
    )
)]
pub async fn get_public_key(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let message = format!("Could not obtain public key for user: {user_name}");
    let profile = state
        .ctx
        .chain
        .get_profile(ProfileQuery::Username(user_name))
        .await
        .map_err(upstream(message))?;
    Ok(Json(profile))
}

#[utoipa::path(
    post,
    path = "/v1/hodlers",
    request_body = HodlersRequest,
    tag = "Profiles",
    responses(
        (status = 200, description = "Raw chain hodlers response"),
        (status = 502, description = "Chain API failure")
    )
)]
pub async fn get_hodlers(
    State(state): State<AppState>,
    Json(request): Json<HodlersRequest>,
) -> Result<Json<Value>, ApiError> {
    let hodlers = state
        .ctx
        .chain
        .get_hodlers(&request.username, request.num_to_fetch)
        .await
        .map_err(upstream("Could not fetch hodlers".to_string()))?;
    Ok(Json(hodlers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::testing::{sample_badge, test_state};
    use axum::http::StatusCode;

    fn caller(id: &str) -> Auth {
        Auth(AuthenticatedUser {
            public_key: id.to_string(),
            role: Role::Member,
            expires_at: None,
        })
    }

    fn body(id: &str) -> Json<BadgeIdRequest> {
        Json(BadgeIdRequest {
            badge_id: id.to_string(),
        })
    }

    async fn issue(state: &AppState, id: &str) {
        state
            .ctx
            .badges()
            .store(&sample_badge(id, "alice", &["bob"]))
            .await
            .unwrap();
        state.ctx.users().create_recipient("bob", id).await.unwrap();
        state.ctx.users().add_issued("alice", id).await.unwrap();
    }

    #[tokio::test]
    async fn get_user_creates_blank_record() {
        let (_dir, state, _) = test_state();
        let Json(user) = get_user(State(state.clone()), Path("dave".into())).await.unwrap();
        assert_eq!(user, UserDetails::default());
        assert!(state.ctx.users().get("dave").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn accept_moves_badge_and_stamps_date() {
        let (_dir, state, _) = test_state();
        issue(&state, "Qm1").await;

        let _ = accept_badge(State(state.clone()), caller("bob"), body("Qm1"))
            .await
            .unwrap();

        let bob = state.ctx.users().get("bob").await.unwrap().unwrap();
        assert!(bob.badges_pending.is_empty());
        assert_eq!(bob.badges_accepted, vec!["Qm1"]);
        assert_eq!(bob.badges_received, vec!["Qm1"]);
        let badge = state.ctx.badges().get("Qm1").await.unwrap().unwrap();
        assert!(badge.date_accepted.is_some());
    }

    #[tokio::test]
    async fn accept_requires_pending_badge() {
        let (_dir, state, _) = test_state();
        issue(&state, "Qm1").await;
        state.ctx.users().get_or_create("carol").await.unwrap();

        let err = accept_badge(State(state.clone()), caller("carol"), body("Qm1"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Qm1 not in pending array");

        let carol = state.ctx.users().get("carol").await.unwrap().unwrap();
        assert_eq!(carol, UserDetails::default());
        let badge = state.ctx.badges().get("Qm1").await.unwrap().unwrap();
        assert!(badge.date_accepted.is_none());
    }

    #[tokio::test]
    async fn blank_badge_id_is_rejected() {
        let (_dir, state, _) = test_state();
        let err = decline_badge(State(state), caller("bob"), body("  "))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn decline_then_decline_again() {
        let (_dir, state, _) = test_state();
        issue(&state, "Qm1").await;

        let _ = decline_badge(State(state.clone()), caller("bob"), body("Qm1"))
            .await
            .unwrap();
        let bob = state.ctx.users().get("bob").await.unwrap().unwrap();
        assert!(bob.badges_pending.is_empty());
        assert_eq!(bob.badges_received, vec!["Qm1"]);

        let err = decline_badge(State(state), caller("bob"), body("Qm1"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn hide_accepted_clears_date() {
        let (_dir, state, _) = test_state();
        issue(&state, "Qm1").await;
        let _ = accept_badge(State(state.clone()), caller("bob"), body("Qm1"))
            .await
            .unwrap();

        let _ = hide_accepted_badge(State(state.clone()), caller("bob"), body("Qm1"))
            .await
            .unwrap();

        let bob = state.ctx.users().get("bob").await.unwrap().unwrap();
        assert!(bob.badges_accepted.is_empty());
        let badge = state.ctx.badges().get("Qm1").await.unwrap().unwrap();
        assert!(badge.date_accepted.is_none());
    }

    #[tokio::test]
    async fn hide_issued_moves_badge() {
        let (_dir, state, _) = test_state();
        issue(&state, "Qm1").await;

        let _ = hide_issued_badge(State(state.clone()), caller("alice"), body("Qm1"))
            .await
            .unwrap();
        let alice = state.ctx.users().get("alice").await.unwrap().unwrap();
        assert!(alice.badges_issued.is_empty());
        assert_eq!(alice.badges_removed_from_issued, vec!["Qm1"]);

        let err = hide_issued_badge(State(state), caller("bob"), body("Qm1"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Qm1 not in issued array");
    }

    #[tokio::test]
    async fn profile_lookups_pass_through() {
        let (_dir, state, _) = test_state();

        let Json(profile) = get_public_key(State(state.clone()), Path("alice".into()))
            .await
            .unwrap();
        assert_eq!(profile["Profile"]["Username"], "alice");

        let Json(profile) = get_username(State(state.clone()), Path("BC1alice".into()))
            .await
            .unwrap();
        assert_eq!(profile["Profile"]["PublicKeyBase58Check"], "BC1alice");

        let request = HodlersRequest {
            username: "alice".into(),
            num_to_fetch: 10,
        };
        let Json(hodlers) = get_hodlers(State(state), Json(request)).await.unwrap();
        assert_eq!(hodlers["NumToFetch"], 10);
    }
}
