// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Stored documents and the request/response bodies of the REST API. Field
//! names are camelCase on the wire and in the document store.
//!
//! ## Model Categories
//!
//! - **Badges**: published credentials and their immutable content
//! - **Users**: per-identity badge and collection sets
//! - **Badge Pages**: listings of badges a user offers to issue
//! - **Collections**: named per-user groupings of badges

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// `validDateEnd` stored for badges without a validity window.
pub const OPEN_ENDED_VALID_DATE: i64 = 8_640_000_000_000_000;

// =============================================================================
// Badge Models
// =============================================================================

/// Everything a badge carries at creation time except its id.
///
/// Field order is the canonical order: the compact JSON serialization of this
/// struct is what gets published to the content store, and the returned
/// content identifier becomes the badge id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BadgeContent {
    pub title: String,
    pub issuer: String,
    /// Chain label of the issuer identity.
    pub issuer_chain: String,
    pub recipients: Vec<String>,
    pub description: String,
    pub image_url: String,
    pub valid_dates: bool,
    /// Epoch milliseconds.
    pub valid_date_start: i64,
    /// Epoch milliseconds.
    pub valid_date_end: i64,
    pub background_color: String,
    pub external_url: String,
    /// Epoch milliseconds, assigned by the server.
    pub date_created: i64,
    pub is_visible: bool,
    /// Opaque attribute blob.
    pub attributes: String,
    /// One chain label per recipient.
    pub recipients_chains: Vec<String>,
}

/// A published badge as stored under `badges/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    /// Content identifier of the published [`BadgeContent`].
    pub id: String,
    #[serde(flatten)]
    pub content: BadgeContent,
    /// Set when the recipient accepts the badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_accepted: Option<i64>,
}

/// Request to issue a badge.
///
/// Shape checks happen in validation, so most fields are optional here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBadgeRequest {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub recipients: Option<Vec<String>>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
    pub background_color: Option<String>,
    /// Must be a boolean.
    #[schema(value_type = Option<bool>)]
    pub valid_dates: Option<Value>,
    /// Integer epoch milliseconds, required when `validDates` is true.
    #[schema(value_type = Option<i64>)]
    pub valid_date_start: Option<Value>,
    /// Integer epoch milliseconds, required when `validDates` is true.
    #[schema(value_type = Option<i64>)]
    pub valid_date_end: Option<Value>,
    /// Signed payment transaction, required above the free tier.
    pub signed_transaction_hex: Option<String>,
    /// Amount paid by `signedTransactionHex`.
    pub amount_nanos: Option<u64>,
}

/// Request naming a single badge.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeIdRequest {
    #[serde(default)]
    pub badge_id: String,
}

/// Batch badge lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetBadgesRequest {
    #[serde(default)]
    pub badge_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BadgesResponse {
    pub badges: Vec<Badge>,
}

/// Unsigned payment transaction covering the paid recipients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct FeeTransactionResponse {
    #[serde(rename = "TransactionHex")]
    pub transaction_hex: String,
    #[serde(rename = "amountNanos")]
    pub amount_nanos: u64,
}

// =============================================================================
// User Models
// =============================================================================

/// Badge and collection sets of one identity, stored under `users/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDetails {
    pub badges_issued: Vec<String>,
    pub badges_received: Vec<String>,
    pub badges_listed: Vec<String>,
    pub badges_pending: Vec<String>,
    pub badges_accepted: Vec<String>,
    pub badges_removed_from_issued: Vec<String>,
    pub issued_collections: Vec<String>,
    pub received_collections: Vec<String>,
}

/// Field names of [`UserDetails`] used in field-level updates.
pub mod user_fields {
    pub const BADGES_ISSUED: &str = "badgesIssued";
    pub const BADGES_RECEIVED: &str = "badgesReceived";
    pub const BADGES_LISTED: &str = "badgesListed";
    pub const BADGES_PENDING: &str = "badgesPending";
    pub const BADGES_ACCEPTED: &str = "badgesAccepted";
    pub const BADGES_REMOVED_FROM_ISSUED: &str = "badgesRemovedFromIssued";
    pub const ISSUED_COLLECTIONS: &str = "issuedCollections";
    pub const RECEIVED_COLLECTIONS: &str = "receivedCollections";
}

/// Request body of the hodlers lookup, forwarded to the chain API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HodlersRequest {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "NumToFetch")]
    pub num_to_fetch: u32,
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub general: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            general: message.into(),
        }
    }
}

// =============================================================================
// Badge Page Models
// =============================================================================

/// A badge a user offers to issue, stored under `badgePages/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BadgePage {
    pub id: String,
    pub title: String,
    pub issuer: String,
    pub pre_reqs: String,
    pub validity: String,
    pub description: String,
    pub external_url: String,
    pub image_url: String,
    pub background_color: String,
    pub category: String,
    pub date_created: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBadgePageRequest {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub pre_reqs: Option<String>,
    pub validity: Option<String>,
    pub description: Option<String>,
    pub external_url: Option<String>,
    pub image_url: Option<String>,
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgePagesResponse {
    pub badge_pages: Vec<BadgePage>,
}

// =============================================================================
// Collection Models
// =============================================================================

/// A named grouping of badges under `users/{id}/collections/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCollection {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub background_color: String,
    pub badges: Vec<String>,
    /// Issuers of the member badges.
    pub issuers: Vec<String>,
    /// Recipients of the member badges.
    pub recipients: Vec<String>,
    /// Received collections group received badges, others issued ones.
    pub received_collection: bool,
    pub is_visible: bool,
    pub date_created: i64,
}

/// Field names of [`BadgeCollection`] used in field-level updates.
pub mod collection_fields {
    pub const BADGES: &str = "badges";
    pub const ISSUERS: &str = "issuers";
    pub const RECIPIENTS: &str = "recipients";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub background_color: Option<String>,
    #[serde(default)]
    pub badges: Vec<String>,
    /// Must be a boolean.
    #[schema(value_type = Option<bool>)]
    pub received_collection: Option<Value>,
}

/// Badges to add to or remove from a named collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CollectionBadgesRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CollectionNameRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionsResponse {
    pub collections: Vec<BadgeCollection>,
}
