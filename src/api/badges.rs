// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::now_ms;
use crate::{
    auth::Auth,
    error::ApiError,
    models::{Badge, BadgesResponse, CreateBadgeRequest, FeeTransactionResponse, GetBadgesRequest},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/v1/badge",
    request_body = CreateBadgeRequest,
    tag = "Badges",
    responses(
        (status = 201, description = "Badge issued", body = Badge),
        (status = 400, description = "Invalid request or payment proof"),
        (status = 403, description = "Issuer is not the caller"),
        (status = 402, description = "Payment was not settled"),
        (status = 500, description = "Badge partially issued"),
        (status = 502, description = "Content store or attestation failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_badge(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<CreateBadgeRequest>,
) -> Result<(StatusCode, Json<Badge>), ApiError> {
    let badge = state
        .ctx
        .issuer()
        .create_badge(user.id(), &request, now_ms())
        .await?;
    Ok((StatusCode::CREATED, Json(badge)))
}

#[utoipa::path(
    get,
    path = "/v1/badge/{id}",
    params(("id" = String, Path, description = "Content identifier of the badge")),
    tag = "Badges",
    responses(
        (status = 200, body = Badge),
        (status = 404, description = "Badge not found")
    )
)]
pub async fn get_badge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Badge>, ApiError> {
    state
        .ctx
        .badges()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Error getting badge: {id}. Doc does not exist.")))
}

#[utoipa::path(
    post,
    path = "/v1/badges",
    request_body = GetBadgesRequest,
    tag = "Badges",
    responses((status = 200, body = BadgesResponse))
)]
pub async fn get_badges(
    State(state): State<AppState>,
    Json(request): Json<GetBadgesRequest>,
) -> Result<Json<BadgesResponse>, ApiError> {
    let badges = state.ctx.badges().get_many(&request.badge_ids).await?;
    Ok(Json(BadgesResponse { badges }))
}

#[utoipa::path(
    get,
    path = "/v1/feeTxn/{sender_key}/{num_recipients}",
    params(
        ("sender_key" = String, Path, description = "Public key paying the fee"),
        ("num_recipients" = String, Path, description = "Positive recipient count")
    ),
    tag = "Badges",
    responses(
        (status = 200, body = FeeTransactionResponse),
        (status = 400, description = "Params are invalid"),
        (status = 502, description = "Chain API failure")
    )
)]
pub async fn fee_transaction(
    State(state): State<AppState>,
    Path((sender_key, num_recipients)): Path<(String, String)>,
) -> Result<Json<FeeTransactionResponse>, ApiError> {
    let sender_key = sender_key.trim();
    let recipients = num_recipients
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0);
    let (Some(recipients), false) = (recipients, sender_key.is_empty()) else {
        return Err(ApiError::bad_request("Params are invalid").with_code("INVALID_PARAMS"));
    };

    let cfg = &state.ctx.issuance;
    let amount = cfg.required_payment(recipients);
    let payment = state
        .ctx
        .chain
        .build_payment(
            sender_key,
            &cfg.platform_username,
            amount,
            cfg.min_fee_rate_nanos_per_kb,
        )
        .await
        .map_err(|e| {
            tracing::warn!(sender = %sender_key, error = %e, "Failed to build fee transaction");
            ApiError::bad_gateway("Error building fee transaction").with_code("CHAIN_ERROR")
        })?;

    Ok(Json(FeeTransactionResponse {
        transaction_hex: payment.transaction_hex,
        amount_nanos: payment.spend_amount_nanos,
    }))
}
