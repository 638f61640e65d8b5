// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only endpoints for operating the issuance pipeline.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::AdminOnly, error::ApiError, state::AppState, storage::ReconciliationEvent,
};

/// Response for reconciliation log queries.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReconciliationResponse {
    /// Events oldest first.
    pub events: Vec<ReconciliationEvent>,
    pub total: usize,
}

/// List issuance failures awaiting manual repair.
#[utoipa::path(
    get,
    path = "/v1/admin/reconciliation",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reconciliation events", body = ReconciliationResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn list_reconciliation(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<ReconciliationResponse>, ApiError> {
    let events = state.ctx.reconciliation().list().await?;
    tracing::info!(admin = %admin.id(), count = events.len(), "Reconciliation log read");

    Ok(Json(ReconciliationResponse {
        total: events.len(),
        events,
    }))
}
