// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.
//!
//! [`ServiceContext`] owns every backend handle (document store, content
//! store, chain client, signer) plus the issuance settings. It is built
//! once at startup with [`ServiceContext::connect`] and shared with the
//! handlers through [`AppState`].

use std::sync::Arc;

use crate::chain::{ChainApiClient, ChainClient, ChainError, HttpSigner, RemoteSigner, SignerError};
use crate::config::{AppConfig, IssuanceConfig};
use crate::content::{ContentError, ContentStore, IpfsContentStore, MemoryContentStore};
use crate::issuance::BadgeIssuer;
use crate::storage::{
    BadgePageRepository, BadgeRepository, CollectionRepository, DocumentError, DocumentStore,
    ReconciliationLog, RedbDocumentStore, UserRepository,
};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("failed to open document store: {0}")]
    Storage(#[from] DocumentError),

    #[error("failed to build content store client: {0}")]
    Content(#[from] ContentError),

    #[error("failed to build chain client: {0}")]
    Chain(#[from] ChainError),

    #[error("failed to build signer client: {0}")]
    Signer(#[from] SignerError),
}

/// Backend handles and settings shared by all requests.
pub struct ServiceContext {
    pub documents: Arc<dyn DocumentStore>,
    pub content: Arc<dyn ContentStore>,
    pub chain: Arc<dyn ChainClient>,
    pub signer: Arc<dyn RemoteSigner>,
    pub issuance: IssuanceConfig,
}

impl ServiceContext {
    /// Open the document database and build the external clients.
    pub async fn connect(config: &AppConfig) -> Result<Self, ContextError> {
        let db_path = config.database_path();
        let documents = {
            let path = db_path.clone();
            tokio::task::spawn_blocking(move || RedbDocumentStore::open(&path))
                .await
                .map_err(|e| DocumentError::Backend(format!("open task failed: {e}")))??
        };
        tracing::info!(path = %db_path.display(), "Opened document store");

        let endpoints = &config.endpoints;
        let content: Arc<dyn ContentStore> = match &endpoints.ipfs_api_url {
            Some(url) => {
                tracing::info!(url = %url, "Publishing content to IPFS");
                Arc::new(IpfsContentStore::new(url, endpoints.timeout)?)
            }
            None => {
                tracing::warn!("IPFS_API_URL not set, publishing content to an in-memory store");
                Arc::new(MemoryContentStore::new())
            }
        };

        let chain = ChainApiClient::new(&endpoints.chain_api_url, endpoints.timeout)?;
        let signer = HttpSigner::new(&endpoints.signer_url, endpoints.timeout)?;

        Ok(Self::from_parts(
            Arc::new(documents),
            content,
            Arc::new(chain),
            Arc::new(signer),
            config.issuance.clone(),
        ))
    }

    pub fn from_parts(
        documents: Arc<dyn DocumentStore>,
        content: Arc<dyn ContentStore>,
        chain: Arc<dyn ChainClient>,
        signer: Arc<dyn RemoteSigner>,
        issuance: IssuanceConfig,
    ) -> Self {
        Self {
            documents,
            content,
            chain,
            signer,
            issuance,
        }
    }

    /// Check the document store and log shutdown.
    ///
    /// The redb file is released when the last handle drops.
    pub async fn close(&self) {
        match self.documents.health_check().await {
            Ok(()) => tracing::info!("Service context closed"),
            Err(e) => tracing::warn!(error = %e, "Document store unhealthy at shutdown"),
        }
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.documents.as_ref())
    }

    pub fn badges(&self) -> BadgeRepository<'_> {
        BadgeRepository::new(self.documents.as_ref())
    }

    pub fn badge_pages(&self) -> BadgePageRepository<'_> {
        BadgePageRepository::new(self.documents.as_ref())
    }

    pub fn collections(&self) -> CollectionRepository<'_> {
        CollectionRepository::new(self.documents.as_ref())
    }

    pub fn reconciliation(&self) -> ReconciliationLog<'_> {
        ReconciliationLog::new(self.documents.as_ref())
    }

    pub fn issuer(&self) -> BadgeIssuer<'_> {
        BadgeIssuer::new(
            self.documents.as_ref(),
            self.content.as_ref(),
            self.chain.as_ref(),
            self.signer.as_ref(),
            &self.issuance,
        )
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Identities granted the admin role.
    pub admin_public_keys: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<ServiceContext>,
    pub auth_config: AuthConfig,
}

impl AppState {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            auth_config: AuthConfig::default(),
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }
}
