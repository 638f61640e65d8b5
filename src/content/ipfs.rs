// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! IPFS HTTP API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use url::Url;

use super::{ContentError, ContentStore};

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Debug, Clone)]
pub struct IpfsContentStore {
    add_url: Url,
    http: Client,
}

impl IpfsContentStore {
    /// Client for the IPFS API rooted at `api_url` (e.g. `http://127.0.0.1:5001`).
    pub fn new(api_url: &Url, timeout: Option<Duration>) -> Result<Self, ContentError> {
        let add_url = api_url
            .join("api/v0/add")
            .map_err(|e| ContentError::Request(format!("invalid IPFS API URL: {e}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ContentError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { add_url, http })
    }
}

#[async_trait]
impl ContentStore for IpfsContentStore {
    async fn add(&self, bytes: Vec<u8>) -> Result<String, ContentError> {
        let form = multipart::Form::new().part("file", multipart::Part::bytes(bytes));

        let response = self
            .http
            .post(self.add_url.clone())
            .query(&[("pin", "true")])
            .multipart(form)
            .send()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Status { status, body });
        }

        let added: AddResponse = response
            .json()
            .await
            .map_err(|e| ContentError::InvalidResponse(e.to_string()))?;

        if added.hash.trim().is_empty() {
            return Err(ContentError::InvalidResponse(
                "add response did not include Hash".to_string(),
            ));
        }

        tracing::debug!(cid = %added.hash, "Published content to IPFS");
        Ok(added.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn add_returns_hash() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/add"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Name": "QmAbc",
                "Hash": "QmAbc",
                "Size": "12"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let store = IpfsContentStore::new(&url, None).unwrap();
        assert_eq!(store.add(b"{}".to_vec()).await.unwrap(), "QmAbc");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/add"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let store = IpfsContentStore::new(&url, None).unwrap();
        match store.add(b"{}".to_vec()).await {
            Err(ContentError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
