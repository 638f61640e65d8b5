// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Badge collections.
//!
//! A received collection may only hold badges in the owner's
//! `badgesReceived`, an issued one only badges in `badgesIssued`. Collection
//! names are unique across both kinds.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::now_ms;
use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        BadgeCollection, CollectionBadgesRequest, CollectionNameRequest, CollectionsResponse,
        CreateCollectionRequest, MessageResponse, UserDetails,
    },
    state::{AppState, ServiceContext},
    storage::Snapshot,
    validation::{dedupe_ids, required_text, validate_collection},
};

/// Every id must be in the owner's received (or issued) badges.
fn check_membership(user: &UserDetails, received: bool, badges: &[String]) -> Result<(), ApiError> {
    let (owned, kind) = if received {
        (&user.badges_received, "received")
    } else {
        (&user.badges_issued, "issued")
    };
    match badges.iter().find(|id| !owned.contains(id)) {
        Some(id) => Err(ApiError::bad_request(format!(
            "{id} does not exist in your {kind} badges."
        ))
        .with_code("BADGE_NOT_OWNED")),
        None => Ok(()),
    }
}

async fn snapshot(ctx: &ServiceContext, badges: &[String]) -> Result<Snapshot, ApiError> {
    let badges = ctx.badges().get_many(badges).await?;
    Ok(Snapshot::of(&badges))
}

fn collection_name(name: &str) -> Result<String, ApiError> {
    Ok(required_text("name", Some(name))?)
}

#[utoipa::path(
    post,
    path = "/v1/createCollection",
    request_body = CreateCollectionRequest,
    tag = "Collections",
    responses(
        (status = 201, body = BadgeCollection),
        (status = 400, description = "Invalid collection, duplicate name or badge not owned")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_collection(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<BadgeCollection>), ApiError> {
    let mut collection = validate_collection(&request, &state.ctx.issuance, now_ms())?;
    let owner = state.ctx.users().get_or_create(user.id()).await?;

    let taken = owner
        .issued_collections
        .iter()
        .chain(&owner.received_collections)
        .any(|name| *name == collection.name);
    if taken {
        return Err(ApiError::bad_request("Collection with same name already exists.")
            .with_code("DUPLICATE_COLLECTION"));
    }
    check_membership(&owner, collection.received_collection, &collection.badges)?;

    let Snapshot {
        issuers,
        recipients,
    } = snapshot(&state.ctx, &collection.badges).await?;
    collection.issuers = issuers;
    collection.recipients = recipients;

    let collections = state.ctx.collections();
    let users = state.ctx.users();
    futures::try_join!(
        collections.save(user.id(), &collection),
        users.add_collection(user.id(), &collection.name, collection.received_collection),
    )?;

    tracing::info!(
        owner = %user.id(),
        name = %collection.name,
        badges = collection.badges.len(),
        "Collection created"
    );
    Ok((StatusCode::CREATED, Json(collection)))
}

#[utoipa::path(
    post,
    path = "/v1/deleteCollection",
    request_body = CollectionNameRequest,
    tag = "Collections",
    responses((status = 200, body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<CollectionNameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name = collection_name(&request.name)?;

    state.ctx.collections().delete(user.id(), &name).await?;
    state.ctx.users().remove_collection(user.id(), &name).await?;

    Ok(Json(MessageResponse::new("Successfully deleted collection.")))
}

#[utoipa::path(
    get,
    path = "/v1/collections/{user_id}/{name}",
    params(
        ("user_id" = String, Path, description = "Owner identity"),
        ("name" = String, Path, description = "Collection name")
    ),
    tag = "Collections",
    responses(
        (status = 200, body = BadgeCollection),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn get_collection(
    State(state): State<AppState>,
    Path((user_id, name)): Path<(String, String)>,
) -> Result<Json<BadgeCollection>, ApiError> {
    state
        .ctx
        .collections()
        .get(&user_id, &name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Error getting collection: {name}")))
}

#[utoipa::path(
    get,
    path = "/v1/collections/{user_id}",
    params(("user_id" = String, Path, description = "Owner identity")),
    tag = "Collections",
    responses((status = 200, body = CollectionsResponse))
)]
pub async fn list_collections(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CollectionsResponse>, ApiError> {
    let collections = state.ctx.collections().list(&user_id).await?;
    Ok(Json(CollectionsResponse { collections }))
}

#[utoipa::path(
    post,
    path = "/v1/addToCollection",
    request_body = CollectionBadgesRequest,
    tag = "Collections",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Badge not owned"),
        (status = 404, description = "Collection not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_collection(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<CollectionBadgesRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let badges = dedupe_ids(&request.badges);
    if badges.is_empty() {
        return Ok(Json(MessageResponse::new("No badges specified in badges array.")));
    }
    let name = collection_name(&request.name)?;

    let owner = state.ctx.users().get_or_create(user.id()).await?;
    let received = if owner.issued_collections.contains(&name) {
        false
    } else if owner.received_collections.contains(&name) {
        true
    } else {
        return Err(ApiError::not_found(format!("Collection {name} does not exist")));
    };
    check_membership(&owner, received, &badges)?;

    let snapshot = snapshot(&state.ctx, &badges).await?;
    state
        .ctx
        .collections()
        .add_badges(user.id(), &name, &badges, &snapshot)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "Successfully updated collection: {name}"
    ))))
}

#[utoipa::path(
    post,
    path = "/v1/removeFromCollection",
    request_body = CollectionBadgesRequest,
    tag = "Collections",
    responses(
        (status = 200, body = MessageResponse),
        (status = 404, description = "Collection not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_from_collection(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<CollectionBadgesRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = dedupe_ids(&request.badges);
    if removed.is_empty() {
        return Ok(Json(MessageResponse::new("No badges specified in badges array.")));
    }
    let name = collection_name(&request.name)?;

    let collections = state.ctx.collections();
    let collection = collections
        .get(user.id(), &name)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Collection with {name} does not exist")))?;

    let remaining: Vec<String> = collection
        .badges
        .into_iter()
        .filter(|id| !removed.contains(id))
        .collect();
    let snapshot = snapshot(&state.ctx, &remaining).await?;
    collections
        .replace_badges(user.id(), &name, &remaining, &snapshot)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "Successfully updated collection: {name}"
    ))))
}
