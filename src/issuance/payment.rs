// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment proof verification for bulk issuance.
//!
//! A signed payment transaction is hex encoded as:
//!
//! ```text
//! [input count: 1 byte][inputs: 33 bytes each][output count: 1 byte]
//! [recipient key: 33 bytes][amount: uvarint]...
//! ```
//!
//! Only the first output is inspected, and its offset assumes single-byte
//! input and output counts.

use crate::config::IssuanceConfig;

/// Hex chars per input (and per public key).
const KEY_HEX_LEN: usize = 66;

/// Hex chars of a single-byte count field.
const COUNT_HEX_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentProofError {
    #[error("Please specify signedTransactionHex and amountNanos. You have over {free_tier} recipients")]
    MissingProof { free_tier: usize },

    #[error("amountNanos is not enough. Must be at least {minimum} for {paid_recipients} recipients")]
    InsufficientAmount { minimum: u64, paid_recipients: usize },

    #[error("Invalid signed transaction hex. Not long enough to be valid")]
    HexTooShort,

    #[error("Invalid transaction hex: input count is not a number")]
    LengthNotParseable,

    #[error("Invalid transaction hex: contains non-hex characters")]
    MalformedHex,

    #[error("Invalid recipient: recipient of transaction must be the platform account")]
    RecipientMismatch,

    #[error("Invalid signed transaction hex: amountNanos does not match")]
    AmountMismatch,
}

impl PaymentProofError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentProofError::MissingProof { .. } => "PAYMENT_PROOF_REQUIRED",
            PaymentProofError::InsufficientAmount { .. } => "PAYMENT_INSUFFICIENT",
            PaymentProofError::HexTooShort => "PAYMENT_HEX_TOO_SHORT",
            PaymentProofError::LengthNotParseable => "PAYMENT_LENGTH_NOT_PARSEABLE",
            PaymentProofError::MalformedHex => "PAYMENT_MALFORMED_HEX",
            PaymentProofError::RecipientMismatch => "PAYMENT_RECIPIENT_MISMATCH",
            PaymentProofError::AmountMismatch => "PAYMENT_AMOUNT_MISMATCH",
        }
    }
}

/// A payment transaction that passed local checks and is ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub signed_transaction_hex: String,
    pub amount_nanos: u64,
}

/// Little-endian base-128 encoding of `value`.
pub fn encode_uvarint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

/// Verify that `signed_hex` pays at least the amount owed for `recipients`
/// to the platform key.
pub fn verify_payment_proof(
    signed_hex: Option<&str>,
    amount_nanos: Option<u64>,
    recipients: usize,
    cfg: &IssuanceConfig,
) -> Result<VerifiedPayment, PaymentProofError> {
    let missing = PaymentProofError::MissingProof {
        free_tier: cfg.free_tier_recipients,
    };
    let hex = signed_hex.map(str::trim).filter(|h| !h.is_empty());
    let (Some(hex), Some(amount)) = (hex, amount_nanos.filter(|a| *a > 0)) else {
        return Err(missing);
    };

    let minimum = cfg.required_payment(recipients);
    if amount < minimum {
        return Err(PaymentProofError::InsufficientAmount {
            minimum,
            paid_recipients: recipients.saturating_sub(cfg.free_tier_recipients),
        });
    }

    if hex.len() <= COUNT_HEX_LEN {
        return Err(PaymentProofError::HexTooShort);
    }

    let input_count = hex
        .get(..COUNT_HEX_LEN)
        .and_then(|count| u8::from_str_radix(count, 16).ok())
        .ok_or(PaymentProofError::LengthNotParseable)?;

    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PaymentProofError::MalformedHex);
    }

    let recipient_idx = COUNT_HEX_LEN + KEY_HEX_LEN * input_count as usize + COUNT_HEX_LEN;
    let amount_idx = recipient_idx + KEY_HEX_LEN;
    let amount_hex = hex::encode(encode_uvarint(amount));

    if amount_idx + amount_hex.len() > hex.len() {
        return Err(PaymentProofError::HexTooShort);
    }

    // every byte is ASCII hex past this point
    let recipient = &hex[recipient_idx..amount_idx];
    if !recipient.eq_ignore_ascii_case(&cfg.platform_public_key_hex) {
        return Err(PaymentProofError::RecipientMismatch);
    }

    let paid = &hex[amount_idx..amount_idx + amount_hex.len()];
    if !paid.eq_ignore_ascii_case(&amount_hex) {
        return Err(PaymentProofError::AmountMismatch);
    }

    Ok(VerifiedPayment {
        signed_transaction_hex: hex.to_string(),
        amount_nanos: amount,
    })
}
