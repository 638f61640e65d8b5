// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Document database status ("ok" or "unavailable").
    pub document_store: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

async fn check_document_store(state: &AppState) -> bool {
    match state.ctx.documents.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Document store health check failed");
            false
        }
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let store_ok = check_document_store(&state).await;

    let response = ReadyResponse {
        status: if store_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            document_store: if store_ok { "ok" } else { "unavailable" }.to_string(),
        },
    };

    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::IssuanceConfig;
    use crate::content::MemoryContentStore;
    use crate::state::ServiceContext;
    use crate::testing::{temp_store, test_state, FailOn, FailingStore, FakeChain, FakeSigner};

    #[tokio::test]
    async fn healthy_store_reports_ok() {
        let (_dir, state, _) = test_state();
        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.document_store, "ok");
    }

    #[tokio::test]
    async fn failing_store_is_not_ready() {
        let (_dir, store) = temp_store();
        let ctx = ServiceContext::from_parts(
            Arc::new(FailingStore::new(store).fail("", FailOn::Any)),
            Arc::new(MemoryContentStore::new()),
            Arc::new(FakeChain::default()),
            Arc::new(FakeSigner::default()),
            IssuanceConfig::default(),
        );
        let state = AppState::new(ctx);

        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.document_store, "unavailable");

        assert_eq!(liveness().await.0.status, "ok");
    }
}
