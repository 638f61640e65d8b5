// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        Badge, BadgeCollection, BadgeContent, BadgeIdRequest, BadgePage, BadgePagesResponse,
        BadgesResponse, CollectionBadgesRequest, CollectionNameRequest, CollectionsResponse,
        CreateBadgePageRequest, CreateBadgeRequest, CreateCollectionRequest,
        FeeTransactionResponse, GetBadgesRequest, HodlersRequest, MessageResponse, UserDetails,
    },
    state::AppState,
    storage::{ReconciliationEvent, ReconciliationKind},
};

pub mod admin;
pub mod badges;
pub mod collections;
pub mod health;
pub mod pages;
pub mod users;

/// Current time in Unix milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        // Badges
        .route("/badge", post(badges::create_badge))
        .route("/badge/{id}", get(badges::get_badge))
        .route("/badges", post(badges::get_badges))
        .route(
            "/feeTxn/{sender_key}/{num_recipients}",
            get(badges::fee_transaction),
        )
        // Users
        .route("/users/{id}", get(users::get_user))
        .route("/acceptBadge", post(users::accept_badge))
        .route("/declineBadge", post(users::decline_badge))
        .route("/hideAcceptedBadge", post(users::hide_accepted_badge))
        .route("/hideIssuedBadge", post(users::hide_issued_badge))
        .route("/username/{public_key}", get(users::get_username))
        .route("/publicKey/{user_name}", get(users::get_public_key))
        .route("/hodlers", post(users::get_hodlers))
        // Badge pages
        .route("/badgePages", post(pages::create_badge_page))
        .route(
            "/badgePages/{id}",
            get(pages::get_badge_page).delete(pages::delete_badge_page),
        )
        .route("/userBadgePages/{user_id}", get(pages::list_user_badge_pages))
        // Collections
        .route("/createCollection", post(collections::create_collection))
        .route("/deleteCollection", post(collections::delete_collection))
        .route("/addToCollection", post(collections::add_to_collection))
        .route(
            "/removeFromCollection",
            post(collections::remove_from_collection),
        )
        .route("/collections/{user_id}", get(collections::list_collections))
        .route(
            "/collections/{user_id}/{name}",
            get(collections::get_collection),
        )
        // Admin
        .route("/admin/reconciliation", get(admin::list_reconciliation))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Registers the bearer token scheme referenced by authenticated paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "ES256 token signed by the account key. \
                             Send the base58check key in the X-Public-Key header.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        badges::create_badge,
        badges::get_badge,
        badges::get_badges,
        badges::fee_transaction,
        users::get_user,
        users::accept_badge,
        users::decline_badge,
        users::hide_accepted_badge,
        users::hide_issued_badge,
        users::get_username,
        users::get_public_key,
        users::get_hodlers,
        pages::create_badge_page,
        pages::get_badge_page,
        pages::list_user_badge_pages,
        pages::delete_badge_page,
        collections::create_collection,
        collections::delete_collection,
        collections::get_collection,
        collections::list_collections,
        collections::add_to_collection,
        collections::remove_from_collection,
        admin::list_reconciliation,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Badge,
            BadgeContent,
            BadgePage,
            BadgeCollection,
            UserDetails,
            CreateBadgeRequest,
            GetBadgesRequest,
            BadgeIdRequest,
            HodlersRequest,
            CreateBadgePageRequest,
            CreateCollectionRequest,
            CollectionBadgesRequest,
            CollectionNameRequest,
            BadgesResponse,
            BadgePagesResponse,
            CollectionsResponse,
            FeeTransactionResponse,
            MessageResponse,
            ReconciliationEvent,
            ReconciliationKind,
            admin::ReconciliationResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Badges", description = "Badge issuance and lookup"),
        (name = "Users", description = "User records and badge decisions"),
        (name = "Badge Pages", description = "Listings of badges available for request"),
        (name = "Collections", description = "Named groups of received or issued badges"),
        (name = "Admin", description = "Operator tooling"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PUBLIC_KEY_HEADER;
    use crate::testing::{account_key, identity_token, test_state};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_dir, state, _) = test_state();
        let response = router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn missing_badge_returns_error_body() {
        let (_dir, state, _) = test_state();
        let response = router(state)
            .oneshot(Request::get("/v1/badge/QmMissing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Error getting badge: QmMissing. Doc does not exist.");
    }

    #[tokio::test]
    async fn mutations_require_identity() {
        let (_dir, state, _) = test_state();
        let response = router(state)
            .oneshot(
                Request::post("/v1/acceptBadge")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"badgeId": "Qm1"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signed_request_creates_badge_page() {
        let (_dir, state, _) = test_state();
        let (public_key, key) = account_key();
        let token = identity_token(&key, Some(chrono::Utc::now().timestamp() + 600));

        let response = router(state.clone())
            .oneshot(
                Request::post("/v1/badgePages")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(PUBLIC_KEY_HEADER, &public_key)
                    .body(Body::from(
                        json!({"title": "Mentor", "issuer": public_key}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let page = body_json(response).await;

        let user = state.ctx.users().get(&public_key).await.unwrap().unwrap();
        assert_eq!(user.badges_listed, vec![page["id"].as_str().unwrap().to_string()]);
    }

    #[test]
    fn openapi_lists_routes_and_bearer_scheme() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(doc["paths"]["/v1/createCollection"].is_object());
        assert!(doc["paths"]["/v1/feeTxn/{sender_key}/{num_recipients}"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}
