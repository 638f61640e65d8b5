// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::now_ms;
use crate::{
    auth::Auth,
    error::ApiError,
    models::{BadgePage, BadgePagesResponse, CreateBadgePageRequest, MessageResponse},
    state::AppState,
    storage::OwnershipCheck,
    validation::validate_badge_page,
};

#[utoipa::path(
    post,
    path = "/v1/badgePages",
    request_body = CreateBadgePageRequest,
    tag = "Badge Pages",
    responses(
        (status = 201, body = BadgePage),
        (status = 400, description = "Invalid page"),
        (status = 403, description = "Issuer is not the caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_badge_page(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<CreateBadgePageRequest>,
) -> Result<(StatusCode, Json<BadgePage>), ApiError> {
    let page = validate_badge_page(
        user.id(),
        Uuid::new_v4().to_string(),
        &request,
        &state.ctx.issuance,
        now_ms(),
    )?;

    state.ctx.badge_pages().save(&page).await?;
    state.ctx.users().add_listed(user.id(), &page.id).await?;

    tracing::info!(page_id = %page.id, issuer = %page.issuer, "Badge page created");
    Ok((StatusCode::CREATED, Json(page)))
}

#[utoipa::path(
    get,
    path = "/v1/badgePages/{id}",
    params(("id" = String, Path, description = "Badge page id")),
    tag = "Badge Pages",
    responses(
        (status = 200, body = BadgePage),
        (status = 404, description = "Page not found")
    )
)]
pub async fn get_badge_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BadgePage>, ApiError> {
    state
        .ctx
        .badge_pages()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Could not get badge page: {id}")))
}

#[utoipa::path(
    get,
    path = "/v1/userBadgePages/{user_id}",
    params(("user_id" = String, Path, description = "Issuer identity")),
    tag = "Badge Pages",
    responses((status = 200, body = BadgePagesResponse))
)]
pub async fn list_user_badge_pages(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BadgePagesResponse>, ApiError> {
    let badge_pages = state.ctx.badge_pages().list_by_issuer(&user_id).await?;
    Ok(Json(BadgePagesResponse { badge_pages }))
}

#[utoipa::path(
    delete,
    path = "/v1/badgePages/{id}",
    params(("id" = String, Path, description = "Badge page id")),
    tag = "Badge Pages",
    responses(
        (status = 200, body = MessageResponse),
        (status = 403, description = "Caller is not the page issuer"),
        (status = 404, description = "Page not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_badge_page(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let pages = state.ctx.badge_pages();
    let page = pages.get(&id).await?.verify_owner(&user, "badge page")?;

    let users = state.ctx.users();
    futures::try_join!(pages.delete(&page.id), users.remove_listed(user.id(), &page.id))?;

    Ok(Json(MessageResponse::new(format!(
        "Successfully deleted page {}",
        page.id
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::testing::test_state;

    fn caller(id: &str) -> Auth {
        Auth(AuthenticatedUser {
            public_key: id.to_string(),
            role: Role::Member,
            expires_at: None,
        })
    }

    fn request(issuer: &str) -> CreateBadgePageRequest {
        CreateBadgePageRequest {
            title: Some("Mentor".into()),
            issuer: Some(issuer.into()),
            description: Some("Awarded to mentors".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_list_and_delete() {
        let (_dir, state, _) = test_state();
        state.ctx.users().get_or_create("alice").await.unwrap();

        let (status, Json(page)) =
            create_badge_page(State(state.clone()), caller("alice"), Json(request("alice")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(!page.id.is_empty());

        let alice = state.ctx.users().get("alice").await.unwrap().unwrap();
        assert_eq!(alice.badges_listed, vec![page.id.clone()]);

        let Json(listed) = list_user_badge_pages(State(state.clone()), Path("alice".into()))
            .await
            .unwrap();
        assert_eq!(listed.badge_pages, vec![page.clone()]);

        let _ = delete_badge_page(State(state.clone()), caller("alice"), Path(page.id.clone()))
            .await
            .unwrap();
        let err = get_badge_page(State(state.clone()), Path(page.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        let alice = state.ctx.users().get("alice").await.unwrap().unwrap();
        assert!(alice.badges_listed.is_empty());
    }

    #[tokio::test]
    async fn only_the_issuer_may_delete() {
        let (_dir, state, _) = test_state();
        state.ctx.users().get_or_create("alice").await.unwrap();
        let (_, Json(page)) =
            create_badge_page(State(state.clone()), caller("alice"), Json(request("alice")))
                .await
                .unwrap();

        let err = delete_badge_page(State(state.clone()), caller("mallory"), Path(page.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert!(state.ctx.badge_pages().get(&page.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rejects_page_for_someone_else() {
        let (_dir, state, _) = test_state();
        let err = create_badge_page(State(state), caller("alice"), Json(request("bob")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
