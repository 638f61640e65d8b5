// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public-key identity verification.
//!
//! Callers authenticate with two values:
//!
//! - `X-Public-Key`: their account key, base58check encoded as a 3-byte
//!   network prefix followed by a 33-byte compressed secp256k1 point
//! - `Authorization: Bearer <jwt>`: a token labelled `ES256` whose raw
//!   `r || s` signature over `header.payload` verifies with that key
//!
//! The token's curve is secp256k1 rather than P-256, so the signature is
//! checked with `k256` directly; `jsonwebtoken` only parses the header and
//! claims.

use base64ct::{Base64UrlUnpadded, Encoding};
use jsonwebtoken::{decode_header, Algorithm};
use k256::ecdsa::{signature::Verifier, Signature, VerifyingKey};

use super::claims::IdentityClaims;
use super::AuthError;

/// Clock skew tolerance (60 seconds).
pub const CLOCK_SKEW_LEEWAY: i64 = 60;

/// Length of the network prefix in a decoded public key.
pub const PUBLIC_KEY_PREFIX_LEN: usize = 3;

/// Length of a compressed secp256k1 public key.
const COMPRESSED_KEY_LEN: usize = 33;

/// Decode a base58check account key into a verifying key.
pub fn decode_public_key(public_key: &str) -> Result<VerifyingKey, AuthError> {
    let bytes = bs58::decode(public_key.trim())
        .with_check(None)
        .into_vec()
        .map_err(|_| AuthError::InvalidPublicKey)?;

    if bytes.len() != PUBLIC_KEY_PREFIX_LEN + COMPRESSED_KEY_LEN {
        return Err(AuthError::InvalidPublicKey);
    }

    VerifyingKey::from_sec1_bytes(&bytes[PUBLIC_KEY_PREFIX_LEN..])
        .map_err(|_| AuthError::InvalidPublicKey)
}

/// Verify `token` against `key` and return its claims.
///
/// `now` is the current Unix time in seconds.
pub fn verify_token(
    token: &str,
    key: &VerifyingKey,
    now: i64,
) -> Result<IdentityClaims, AuthError> {
    let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
    if header.alg != Algorithm::ES256 {
        return Err(AuthError::UnsupportedAlgorithm);
    }

    let (signing_input, encoded_signature) =
        token.rsplit_once('.').ok_or(AuthError::MalformedToken)?;
    let raw_signature =
        Base64UrlUnpadded::decode_vec(encoded_signature).map_err(|_| AuthError::MalformedToken)?;
    let signature = Signature::from_slice(&raw_signature).map_err(|_| AuthError::InvalidSignature)?;
    // k256 only accepts low-S signatures
    let signature = signature.normalize_s().unwrap_or(signature);

    key.verify(signing_input.as_bytes(), &signature)
        .map_err(|_| AuthError::InvalidSignature)?;

    let claims = jsonwebtoken::dangerous::insecure_decode::<IdentityClaims>(token)
        .map_err(|_| AuthError::MalformedToken)?
        .claims;

    if let Some(exp) = claims.exp {
        if exp < now - CLOCK_SKEW_LEEWAY {
            return Err(AuthError::TokenExpired);
        }
    }

    Ok(claims)
}

/// Verify a token for an account key in one step.
pub fn verify_identity(
    public_key: &str,
    token: &str,
    now: i64,
) -> Result<IdentityClaims, AuthError> {
    let key = decode_public_key(public_key)?;
    verify_token(token, &key, now)
}
