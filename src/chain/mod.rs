// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Chain API Module
//!
//! HTTP client for the social chain node API (`/api/v0/...`) and the
//! remote transaction signer.
//!
//! The node reports failures in two ways: a non-success HTTP status, or a
//! 200 response whose JSON body carries an `error` field. Both map to
//! [`ChainError`].

pub mod signer;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

pub use signer::{HttpSigner, RemoteSigner, SignerError};
pub use types::{PaymentTransaction, ProfileQuery};

use types::{
    HodlersQuery, PostTransaction, SendRequest, SubmitPostRequest, SubmitTransactionRequest,
};

const SUBMIT_TRANSACTION: &str = "api/v0/submit-transaction";
const SEND: &str = "api/v0/send-bitclout";
const SUBMIT_POST: &str = "api/v0/submit-post";
const GET_SINGLE_PROFILE: &str = "api/v0/get-single-profile";
const GET_HODLERS: &str = "api/v0/get-hodlers-for-public-key";

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("invalid chain API URL: {0}")]
    InvalidUrl(String),

    #[error("chain API request failed: {0}")]
    Request(String),

    #[error("chain API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("chain API rejected the request: {0}")]
    Rejected(String),

    #[error("chain API response was invalid: {0}")]
    InvalidResponse(String),
}

/// Operations used against the chain node.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Broadcast a signed transaction.
    async fn submit_transaction(&self, signed_hex: &str) -> Result<Value, ChainError>;

    /// Build an unsigned payment from `sender` to `recipient` (key or username).
    async fn build_payment(
        &self,
        sender: &str,
        recipient: &str,
        amount_nanos: u64,
        min_fee_rate_nanos_per_kb: u64,
    ) -> Result<PaymentTransaction, ChainError>;

    /// Build an unsigned post transaction and return its hex.
    async fn build_post(
        &self,
        updater: &str,
        body: &str,
        min_fee_rate_nanos_per_kb: u64,
    ) -> Result<String, ChainError>;

    /// Raw `get-single-profile` response.
    async fn get_profile(&self, query: ProfileQuery) -> Result<Value, ChainError>;

    /// Raw `get-hodlers-for-public-key` response.
    async fn get_hodlers(&self, username: &str, num_to_fetch: u32) -> Result<Value, ChainError>;
}

/// [`ChainClient`] over the node's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct ChainApiClient {
    base_url: Url,
    http: Client,
}

impl ChainApiClient {
    pub fn new(base_url: &Url, timeout: Option<Duration>) -> Result<Self, ChainError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ChainError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.clone(),
            http,
        })
    }

    async fn post_value<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, ChainError> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| ChainError::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ChainError::Request(format!("{endpoint}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Status { status, body });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("{endpoint}: {e}")))?;

        if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ChainError::Rejected(message));
        }

        Ok(value)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ChainError> {
        let value = self.post_value(endpoint, body).await?;
        serde_json::from_value(value)
            .map_err(|e| ChainError::InvalidResponse(format!("{endpoint}: {e}")))
    }
}

#[async_trait]
impl ChainClient for ChainApiClient {
    async fn submit_transaction(&self, signed_hex: &str) -> Result<Value, ChainError> {
        let value = self
            .post_value(
                SUBMIT_TRANSACTION,
                &SubmitTransactionRequest {
                    transaction_hex: signed_hex,
                },
            )
            .await?;
        tracing::debug!("Submitted transaction");
        Ok(value)
    }

    async fn build_payment(
        &self,
        sender: &str,
        recipient: &str,
        amount_nanos: u64,
        min_fee_rate_nanos_per_kb: u64,
    ) -> Result<PaymentTransaction, ChainError> {
        self.post(
            SEND,
            &SendRequest {
                sender_public_key_base58_check: sender,
                recipient_public_key_or_username: recipient,
                amount_nanos,
                min_fee_rate_nanos_per_kb,
            },
        )
        .await
    }

    async fn build_post(
        &self,
        updater: &str,
        body: &str,
        min_fee_rate_nanos_per_kb: u64,
    ) -> Result<String, ChainError> {
        let request = SubmitPostRequest::new(updater, body, min_fee_rate_nanos_per_kb);
        let tx: PostTransaction = self.post(SUBMIT_POST, &request).await?;
        Ok(tx.transaction_hex)
    }

    async fn get_profile(&self, query: ProfileQuery) -> Result<Value, ChainError> {
        self.post_value(GET_SINGLE_PROFILE, &query).await
    }

    async fn get_hodlers(&self, username: &str, num_to_fetch: u32) -> Result<Value, ChainError> {
        self.post_value(
            GET_HODLERS,
            &HodlersQuery {
                username,
                num_to_fetch,
            },
        )
        .await
    }
}
