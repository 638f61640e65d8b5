// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire types of the chain HTTP API.
//!
//! The API uses PascalCase field names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `send-bitclout` request: build an unsigned payment transaction.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SendRequest<'a> {
    pub sender_public_key_base58_check: &'a str,
    pub recipient_public_key_or_username: &'a str,
    pub amount_nanos: u64,
    #[serde(rename = "MinFeeRateNanosPerKB")]
    pub min_fee_rate_nanos_per_kb: u64,
}

/// Unsigned payment transaction returned by `send-bitclout`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentTransaction {
    pub transaction_hex: String,
    #[serde(default)]
    pub spend_amount_nanos: u64,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PostBody {
    pub body: String,
    #[serde(rename = "ImageURLs")]
    pub image_urls: Vec<String>,
}

/// `submit-post` request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SubmitPostRequest<'a> {
    pub updater_public_key_base58_check: &'a str,
    pub post_hash_hex_to_modify: &'a str,
    #[serde(rename = "ParentStakeID")]
    pub parent_stake_id: &'a str,
    pub title: &'a str,
    pub body_obj: PostBody,
    pub reclouted_post_hash_hex: &'a str,
    pub post_extra_data: serde_json::Map<String, Value>,
    pub sub: &'a str,
    pub is_hidden: bool,
    #[serde(rename = "MinFeeRateNanosPerKB")]
    pub min_fee_rate_nanos_per_kb: u64,
}

impl<'a> SubmitPostRequest<'a> {
    /// A new top-level post whose body is `body`.
    pub fn new(updater: &'a str, body: &str, min_fee_rate_nanos_per_kb: u64) -> Self {
        Self {
            updater_public_key_base58_check: updater,
            post_hash_hex_to_modify: "",
            parent_stake_id: "",
            title: "",
            body_obj: PostBody {
                body: body.to_string(),
                image_urls: Vec::new(),
            },
            reclouted_post_hash_hex: "",
            post_extra_data: serde_json::Map::new(),
            sub: "",
            is_hidden: false,
            min_fee_rate_nanos_per_kb,
        }
    }
}

/// Unsigned post transaction returned by `submit-post`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PostTransaction {
    pub transaction_hex: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SubmitTransactionRequest<'a> {
    pub transaction_hex: &'a str,
}

/// Profile lookup key for `get-single-profile`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum ProfileQuery {
    #[serde(rename = "Username")]
    Username(String),
    #[serde(rename = "PublicKeyBase58Check")]
    PublicKey(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct HodlersQuery<'a> {
    pub username: &'a str,
    pub num_to_fetch: u32,
}
