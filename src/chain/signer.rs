// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote transaction signer.
//!
//! The attestation account's key never touches this service; unsigned
//! transactions are sent to a signing endpoint that answers
//! `{"transactionHex"}` with `{"signedHex"}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("signer request failed: {0}")]
    Request(String),

    #[error("signer returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("signer response was invalid: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait RemoteSigner: Send + Sync {
    /// Sign an unsigned transaction and return the signed hex.
    async fn sign(&self, transaction_hex: &str) -> Result<String, SignerError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest<'a> {
    transaction_hex: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignResponse {
    signed_hex: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpSigner {
    url: Url,
    http: Client,
}

impl HttpSigner {
    pub fn new(url: &Url, timeout: Option<Duration>) -> Result<Self, SignerError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SignerError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.clone(),
            http,
        })
    }
}

#[async_trait]
impl RemoteSigner for HttpSigner {
    async fn sign(&self, transaction_hex: &str) -> Result<String, SignerError> {
        let response = self
            .http
            .post(self.url.clone())
            .json(&SignRequest { transaction_hex })
            .send()
            .await
            .map_err(|e| SignerError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SignerError::Status { status, body });
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|e| SignerError::InvalidResponse(e.to_string()))?;

        signed
            .signed_hex
            .filter(|hex| !hex.is_empty())
            .ok_or_else(|| SignerError::InvalidResponse("missing signedHex".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signer(server: &MockServer) -> HttpSigner {
        let url = Url::parse(&format!("{}/api/sign", server.uri())).unwrap();
        HttpSigner::new(&url, Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn returns_signed_hex() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sign"))
            .and(body_json(json!({ "transactionHex": "aa" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "signedHex": "aabb" })))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(signer(&server).sign("aa").await.unwrap(), "aabb");
    }

    #[tokio::test]
    async fn missing_signed_hex_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sign"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        assert!(matches!(
            signer(&server).sign("aa").await,
            Err(SignerError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sign"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(matches!(
            signer(&server).sign("aa").await,
            Err(SignerError::Status { status: 503, .. })
        ));
    }
}
