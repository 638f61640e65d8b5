// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test fixtures shared across modules.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use k256::ecdsa::{signature::Signer, Signature, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::chain::{ChainClient, ChainError, PaymentTransaction, ProfileQuery, RemoteSigner, SignerError};
use crate::config::IssuanceConfig;
use crate::content::{ContentError, ContentStore, MemoryContentStore};
use crate::issuance::encode_uvarint;
use crate::models::{Badge, BadgeContent, OPEN_ENDED_VALID_DATE};
use crate::state::{AppState, AuthConfig, ServiceContext};
use crate::storage::{
    DocPath, Document, DocumentError, DocumentResult, DocumentStore, FieldOp, Filter,
    Precondition, RedbDocumentStore,
};

/// Network prefix of mainnet account keys.
const ACCOUNT_KEY_PREFIX: [u8; 3] = [0xcd, 0x14, 0x00];

pub fn temp_store() -> (TempDir, RedbDocumentStore) {
    let dir = TempDir::new().unwrap();
    let store = RedbDocumentStore::open(&dir.path().join("documents.redb")).unwrap();
    (dir, store)
}

pub fn sample_badge(id: &str, issuer: &str, recipients: &[&str]) -> Badge {
    let recipients: Vec<String> = recipients.iter().map(|r| r.to_string()).collect();
    Badge {
        id: id.to_string(),
        content: BadgeContent {
            title: "Intro".into(),
            issuer: issuer.into(),
            issuer_chain: "$CLOUT".into(),
            recipients_chains: vec!["$CLOUT".to_string(); recipients.len()],
            recipients,
            description: String::new(),
            image_url: "https://img.example/badge.png".into(),
            valid_dates: false,
            valid_date_start: 0,
            valid_date_end: OPEN_ENDED_VALID_DATE,
            background_color: "black".into(),
            external_url: String::new(),
            date_created: 1_700_000_000_000,
            is_visible: true,
            attributes: String::new(),
        },
        date_accepted: None,
    }
}

fn keypair(seed: u8) -> (String, SigningKey) {
    let signing_key = SigningKey::from_slice(&[seed; 32]).unwrap();
    let point = k256::PublicKey::from(signing_key.verifying_key()).to_encoded_point(true);

    let mut bytes = ACCOUNT_KEY_PREFIX.to_vec();
    bytes.extend_from_slice(point.as_bytes());
    (bs58::encode(bytes).with_check().into_string(), signing_key)
}

pub fn account_key() -> (String, SigningKey) {
    keypair(7)
}

pub fn other_account_key() -> (String, SigningKey) {
    keypair(9)
}

/// Identity token signed the way wallets sign them.
pub fn identity_token(key: &SigningKey, exp: Option<i64>) -> String {
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"ES256","typ":"JWT"}"#);
    let claims = match exp {
        Some(exp) => json!({ "exp": exp }),
        None => json!({}),
    };
    let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
    let signing_input = format!("{header}.{payload}");
    let signature: Signature = key.sign(signing_input.as_bytes());
    format!(
        "{signing_input}.{}",
        Base64UrlUnpadded::encode_string(&signature.to_bytes())
    )
}

// =============================================================================
// Chain and signer
// =============================================================================

#[derive(Default)]
struct ChainLog {
    submitted: Vec<String>,
    posts: Vec<String>,
    payments: Vec<(String, String, u64)>,
}

/// In-process [`ChainClient`] that records every call.
#[derive(Default)]
pub struct FakeChain {
    log: Mutex<ChainLog>,
    fail_submit_prefix: Option<String>,
}

impl FakeChain {
    /// Reject every submitted transaction.
    pub fn fail_submit(self) -> Self {
        self.fail_submit_of("")
    }

    /// Reject submitted transactions starting with `prefix`.
    pub fn fail_submit_of(mut self, prefix: &str) -> Self {
        self.fail_submit_prefix = Some(prefix.to_string());
        self
    }

    pub fn submitted(&self) -> Vec<String> {
        self.log.lock().unwrap().submitted.clone()
    }

    pub fn posts(&self) -> Vec<String> {
        self.log.lock().unwrap().posts.clone()
    }

    pub fn payments(&self) -> Vec<(String, String, u64)> {
        self.log.lock().unwrap().payments.clone()
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn submit_transaction(&self, signed_hex: &str) -> Result<Value, ChainError> {
        if let Some(prefix) = &self.fail_submit_prefix {
            if signed_hex.starts_with(prefix.as_str()) {
                return Err(ChainError::Rejected("transaction rejected".into()));
            }
        }
        self.log.lock().unwrap().submitted.push(signed_hex.to_string());
        Ok(json!({ "TxnHashHex": "00" }))
    }

    async fn build_payment(
        &self,
        sender: &str,
        recipient: &str,
        amount_nanos: u64,
        _min_fee_rate_nanos_per_kb: u64,
    ) -> Result<PaymentTransaction, ChainError> {
        self.log
            .lock()
            .unwrap()
            .payments
            .push((sender.to_string(), recipient.to_string(), amount_nanos));
        Ok(PaymentTransaction {
            transaction_hex: format!("pay:{sender}:{recipient}:{amount_nanos}"),
            spend_amount_nanos: amount_nanos,
        })
    }

    async fn build_post(
        &self,
        _updater: &str,
        body: &str,
        _min_fee_rate_nanos_per_kb: u64,
    ) -> Result<String, ChainError> {
        self.log.lock().unwrap().posts.push(body.to_string());
        Ok(format!("post:{body}"))
    }

    async fn get_profile(&self, query: ProfileQuery) -> Result<Value, ChainError> {
        let profile = match query {
            ProfileQuery::Username(username) => json!({ "Username": username }),
            ProfileQuery::PublicKey(key) => json!({ "PublicKeyBase58Check": key }),
        };
        Ok(json!({ "Profile": profile }))
    }

    async fn get_hodlers(&self, username: &str, num_to_fetch: u32) -> Result<Value, ChainError> {
        Ok(json!({ "Hodlers": [], "Username": username, "NumToFetch": num_to_fetch }))
    }
}

/// Signer that prefixes transactions with `signed:`.
#[derive(Default)]
pub struct FakeSigner {
    failing: bool,
}

impl FakeSigner {
    pub fn failing() -> Self {
        Self { failing: true }
    }
}

#[async_trait]
impl RemoteSigner for FakeSigner {
    async fn sign(&self, transaction_hex: &str) -> Result<String, SignerError> {
        if self.failing {
            return Err(SignerError::Request("signer unavailable".into()));
        }
        Ok(format!("signed:{transaction_hex}"))
    }
}

/// Content store that is always down.
pub struct FailingContentStore;

#[async_trait]
impl ContentStore for FailingContentStore {
    async fn add(&self, _bytes: Vec<u8>) -> Result<String, ContentError> {
        Err(ContentError::Request("content store unavailable".into()))
    }
}

// =============================================================================
// Failure injection for documents
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Read,
    Write,
    Any,
}

/// Wraps a store and fails operations on matching keys.
///
/// A rule matches its own key and everything nested under it. The empty key
/// fails health checks.
pub struct FailingStore<S> {
    inner: S,
    rules: Vec<(String, FailOn)>,
}

impl<S: DocumentStore> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            rules: Vec::new(),
        }
    }

    pub fn fail(mut self, key: &str, on: FailOn) -> Self {
        self.rules.push((key.to_string(), on));
        self
    }

    fn check(&self, key: &str, write: bool) -> DocumentResult<()> {
        let hit = self.rules.iter().any(|(rule, on)| {
            let applies = match on {
                FailOn::Read => !write,
                FailOn::Write => write,
                FailOn::Any => true,
            };
            applies && (key == rule || key.starts_with(&format!("{rule}/")))
        });
        if hit {
            Err(DocumentError::Backend(format!("injected failure on {key}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for FailingStore<S> {
    async fn get(&self, path: &DocPath) -> DocumentResult<Option<Document>> {
        self.check(path.as_str(), false)?;
        self.inner.get(path).await
    }

    async fn set(&self, path: &DocPath, doc: Document) -> DocumentResult<()> {
        self.check(path.as_str(), true)?;
        self.inner.set(path, doc).await
    }

    async fn create(&self, path: &DocPath, doc: Document) -> DocumentResult<()> {
        self.check(path.as_str(), true)?;
        self.inner.create(path, doc).await
    }

    async fn update(
        &self,
        path: &DocPath,
        ops: Vec<FieldOp>,
        precondition: Option<Precondition>,
    ) -> DocumentResult<()> {
        self.check(path.as_str(), true)?;
        self.inner.update(path, ops, precondition).await
    }

    async fn delete(&self, path: &DocPath) -> DocumentResult<()> {
        self.check(path.as_str(), true)?;
        self.inner.delete(path).await
    }

    async fn query(
        &self,
        collection: &str,
        filter: Option<Filter>,
    ) -> DocumentResult<Vec<(String, Document)>> {
        self.check(collection, false)?;
        self.inner.query(collection, filter).await
    }

    async fn health_check(&self) -> DocumentResult<()> {
        self.check("", false)?;
        self.inner.health_check().await
    }
}

// =============================================================================
// Application state
// =============================================================================

/// Payment transaction hex with one input and one output to `recipient`.
pub fn payment_hex(recipient: &str, amount: u64) -> String {
    format!(
        "01{}01{recipient}{}0000",
        "aa".repeat(33),
        hex::encode(encode_uvarint(amount))
    )
}

/// Context backed by a temporary database, an in-memory content store and
/// the fake chain and signer.
pub fn test_context() -> (TempDir, ServiceContext, Arc<FakeChain>) {
    let (dir, store) = temp_store();
    let chain = Arc::new(FakeChain::default());
    let ctx = ServiceContext::from_parts(
        Arc::new(store),
        Arc::new(MemoryContentStore::new()),
        chain.clone(),
        Arc::new(FakeSigner::default()),
        IssuanceConfig::default(),
    );
    (dir, ctx, chain)
}

pub fn test_state() -> (TempDir, AppState, Arc<FakeChain>) {
    let (dir, ctx, chain) = test_context();
    let (admin, _) = other_account_key();
    let state = AppState::new(ctx).with_auth_config(AuthConfig {
        admin_public_keys: vec![admin],
    });
    (dir, state, chain)
}
