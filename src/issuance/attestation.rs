// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-chain attestation of issued badges.
//!
//! A post whose body is the badge's content identifier is built for the
//! attestation account, signed remotely and broadcast.

use crate::chain::{ChainClient, ChainError, RemoteSigner, SignerError};
use crate::config::IssuanceConfig;

#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    #[error("failed to build attestation post: {0}")]
    Build(#[source] ChainError),

    #[error("failed to sign attestation post: {0}")]
    Sign(#[source] SignerError),

    #[error("failed to submit attestation post: {0}")]
    Submit(#[source] ChainError),
}

pub struct AttestationPoster<'a> {
    chain: &'a dyn ChainClient,
    signer: &'a dyn RemoteSigner,
    cfg: &'a IssuanceConfig,
}

impl<'a> AttestationPoster<'a> {
    pub fn new(
        chain: &'a dyn ChainClient,
        signer: &'a dyn RemoteSigner,
        cfg: &'a IssuanceConfig,
    ) -> Self {
        Self { chain, signer, cfg }
    }

    /// Post `badge_id` from the attestation account.
    pub async fn post(&self, badge_id: &str) -> Result<(), AttestationError> {
        let unsigned = self
            .chain
            .build_post(
                &self.cfg.attestation_public_key,
                badge_id,
                self.cfg.min_fee_rate_nanos_per_kb,
            )
            .await
            .map_err(AttestationError::Build)?;

        let signed = self
            .signer
            .sign(&unsigned)
            .await
            .map_err(AttestationError::Sign)?;

        self.chain
            .submit_transaction(&signed)
            .await
            .map_err(AttestationError::Submit)?;

        tracing::info!(badge_id = %badge_id, "Attested badge on chain");
        Ok(())
    }
}
