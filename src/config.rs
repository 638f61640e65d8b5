// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the typed configuration loaded
//! from them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the document database | `./data` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files enabling HTTPS | unset |
//! | `CHAIN_API_URL` | Chain HTTP API base | `https://bitclout.com` |
//! | `SIGNER_URL` | Remote signer endpoint | platform signer |
//! | `IPFS_API_URL` | IPFS HTTP API base (unset: in-memory store) | unset |
//! | `EXTERNAL_TIMEOUT_SECS` | Timeout for outbound HTTP calls | unset |
//! | `FREE_TIER_RECIPIENTS` | Recipients issued without payment | `25` |
//! | `NANOS_PER_RECIPIENT` | Price per recipient above the free tier | `5000000` |
//! | `PLATFORM_PUBLIC_KEY_HEX` | Payment recipient key (compressed, hex) | platform key |
//! | `PLATFORM_USERNAME` | Payment recipient username | `BitBadges` |
//! | `ATTESTATION_PUBLIC_KEY` | Updater key of attestation posts | platform poster |
//! | `MIN_FEE_RATE_NANOS_PER_KB` | Fee rate for built transactions | `1000` |
//! | `DEFAULT_IMAGE_URL` | Placeholder badge image | platform image |
//! | `CHAIN_TAG` | Chain label stored on badges | `$CLOUT` |
//! | `ADMIN_PUBLIC_KEYS` | Comma-separated admin identities | empty |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const CHAIN_API_URL_ENV: &str = "CHAIN_API_URL";
pub const SIGNER_URL_ENV: &str = "SIGNER_URL";
pub const IPFS_API_URL_ENV: &str = "IPFS_API_URL";
pub const EXTERNAL_TIMEOUT_SECS_ENV: &str = "EXTERNAL_TIMEOUT_SECS";
pub const FREE_TIER_RECIPIENTS_ENV: &str = "FREE_TIER_RECIPIENTS";
pub const NANOS_PER_RECIPIENT_ENV: &str = "NANOS_PER_RECIPIENT";
pub const PLATFORM_PUBLIC_KEY_HEX_ENV: &str = "PLATFORM_PUBLIC_KEY_HEX";
pub const PLATFORM_USERNAME_ENV: &str = "PLATFORM_USERNAME";
pub const ATTESTATION_PUBLIC_KEY_ENV: &str = "ATTESTATION_PUBLIC_KEY";
pub const MIN_FEE_RATE_ENV: &str = "MIN_FEE_RATE_NANOS_PER_KB";
pub const DEFAULT_IMAGE_URL_ENV: &str = "DEFAULT_IMAGE_URL";
pub const CHAIN_TAG_ENV: &str = "CHAIN_TAG";
pub const ADMIN_PUBLIC_KEYS_ENV: &str = "ADMIN_PUBLIC_KEYS";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_CHAIN_API_URL: &str = "https://bitclout.com";
pub const DEFAULT_SIGNER_URL: &str =
    "https://us-central1-bitbadgespostbot.cloudfunctions.net/api/sign";
pub const DEFAULT_FREE_TIER_RECIPIENTS: usize = 25;
pub const DEFAULT_NANOS_PER_RECIPIENT: u64 = 5_000_000;
pub const DEFAULT_PLATFORM_PUBLIC_KEY_HEX: &str =
    "02b6e2717127e11282ccdee91e176381a25f1114f2e21d994e14beda538e303698";
pub const DEFAULT_PLATFORM_USERNAME: &str = "BitBadges";
pub const DEFAULT_ATTESTATION_PUBLIC_KEY: &str =
    "BC1YLgvPruTYF3R66H96g1nCq9jhewpH7k8iwjQr7WoLacby8tNZNan";
pub const DEFAULT_MIN_FEE_RATE_NANOS_PER_KB: u64 = 1000;
pub const DEFAULT_IMAGE_URL: &str = "https://images.bitclout.com/59638de19a21210d7ddd47ecec5ec041532930d5ec76b88b6ccebb14b2e6f571.webp";
pub const DEFAULT_CHAIN_TAG: &str = "$CLOUT";

/// File name of the document database inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "badges.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

/// Issuance rules and platform identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceConfig {
    pub free_tier_recipients: usize,
    pub nanos_per_recipient: u64,
    /// Lowercase hex of the compressed key that must receive payments.
    pub platform_public_key_hex: String,
    pub platform_username: String,
    pub attestation_public_key: String,
    pub min_fee_rate_nanos_per_kb: u64,
    pub default_image_url: String,
    pub chain_tag: String,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            free_tier_recipients: DEFAULT_FREE_TIER_RECIPIENTS,
            nanos_per_recipient: DEFAULT_NANOS_PER_RECIPIENT,
            platform_public_key_hex: DEFAULT_PLATFORM_PUBLIC_KEY_HEX.to_string(),
            platform_username: DEFAULT_PLATFORM_USERNAME.to_string(),
            attestation_public_key: DEFAULT_ATTESTATION_PUBLIC_KEY.to_string(),
            min_fee_rate_nanos_per_kb: DEFAULT_MIN_FEE_RATE_NANOS_PER_KB,
            default_image_url: DEFAULT_IMAGE_URL.to_string(),
            chain_tag: DEFAULT_CHAIN_TAG.to_string(),
        }
    }
}

impl IssuanceConfig {
    /// Payment owed for issuing to `recipients` identities.
    pub fn required_payment(&self, recipients: usize) -> u64 {
        let paid = recipients.saturating_sub(self.free_tier_recipients) as u64;
        paid.saturating_mul(self.nanos_per_recipient)
    }

    pub fn requires_payment(&self, recipients: usize) -> bool {
        recipients > self.free_tier_recipients
    }
}

/// Locations of the external services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub chain_api_url: Url,
    pub signer_url: Url,
    pub ipfs_api_url: Option<Url>,
    pub timeout: Option<Duration>,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            chain_api_url: Url::parse(DEFAULT_CHAIN_API_URL).expect("default chain URL is valid"),
            signer_url: Url::parse(DEFAULT_SIGNER_URL).expect("default signer URL is valid"),
            ipfs_api_url: None,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub tls: Option<TlsPaths>,
    pub admin_public_keys: Vec<String>,
    pub issuance: IssuanceConfig,
    pub endpoints: ServiceEndpoints,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_or(PORT_ENV, var(PORT_ENV), DEFAULT_PORT)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("{e}"),
            })?;

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        let admin_public_keys = var(ADMIN_PUBLIC_KEYS_ENV)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let platform_public_key_hex = var(PLATFORM_PUBLIC_KEY_HEX_ENV)
            .unwrap_or_else(|| DEFAULT_PLATFORM_PUBLIC_KEY_HEX.to_string())
            .to_ascii_lowercase();
        if platform_public_key_hex.len() != 66 || hex::decode(&platform_public_key_hex).is_err() {
            return Err(ConfigError::Invalid {
                name: PLATFORM_PUBLIC_KEY_HEX_ENV,
                reason: "expected 66 hex characters".to_string(),
            });
        }

        let issuance = IssuanceConfig {
            free_tier_recipients: parse_or(
                FREE_TIER_RECIPIENTS_ENV,
                var(FREE_TIER_RECIPIENTS_ENV),
                DEFAULT_FREE_TIER_RECIPIENTS,
            )?,
            nanos_per_recipient: parse_or(
                NANOS_PER_RECIPIENT_ENV,
                var(NANOS_PER_RECIPIENT_ENV),
                DEFAULT_NANOS_PER_RECIPIENT,
            )?,
            platform_public_key_hex,
            platform_username: var(PLATFORM_USERNAME_ENV)
                .unwrap_or_else(|| DEFAULT_PLATFORM_USERNAME.to_string()),
            attestation_public_key: var(ATTESTATION_PUBLIC_KEY_ENV)
                .unwrap_or_else(|| DEFAULT_ATTESTATION_PUBLIC_KEY.to_string()),
            min_fee_rate_nanos_per_kb: parse_or(
                MIN_FEE_RATE_ENV,
                var(MIN_FEE_RATE_ENV),
                DEFAULT_MIN_FEE_RATE_NANOS_PER_KB,
            )?,
            default_image_url: var(DEFAULT_IMAGE_URL_ENV)
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            chain_tag: var(CHAIN_TAG_ENV).unwrap_or_else(|| DEFAULT_CHAIN_TAG.to_string()),
        };

        let timeout = match var(EXTERNAL_TIMEOUT_SECS_ENV) {
            Some(raw) => Some(Duration::from_secs(parse_or(
                EXTERNAL_TIMEOUT_SECS_ENV,
                Some(raw),
                0u64,
            )?)),
            None => None,
        };

        let endpoints = ServiceEndpoints {
            chain_api_url: parse_url(
                CHAIN_API_URL_ENV,
                var(CHAIN_API_URL_ENV).as_deref().unwrap_or(DEFAULT_CHAIN_API_URL),
            )?,
            signer_url: parse_url(
                SIGNER_URL_ENV,
                var(SIGNER_URL_ENV).as_deref().unwrap_or(DEFAULT_SIGNER_URL),
            )?,
            ipfs_api_url: var(IPFS_API_URL_ENV)
                .map(|raw| parse_url(IPFS_API_URL_ENV, &raw))
                .transpose()?,
            timeout,
        };

        Ok(Self {
            bind_addr,
            data_dir: var(DATA_DIR_ENV)
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            tls,
            admin_public_keys,
            issuance,
            endpoints,
        })
    }

    /// Path of the document database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: format!("{raw:?}: {e}"),
        }),
        None => Ok(default),
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("{raw:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(cfg.issuance, IssuanceConfig::default());
        assert_eq!(cfg.endpoints, ServiceEndpoints::default());
        assert!(cfg.tls.is_none());
        assert!(cfg.admin_public_keys.is_empty());
        assert_eq!(cfg.database_path(), PathBuf::from("./data/badges.redb"));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = load(&[
            (PORT_ENV, "9000"),
            (FREE_TIER_RECIPIENTS_ENV, "10"),
            (EXTERNAL_TIMEOUT_SECS_ENV, "15"),
            (IPFS_API_URL_ENV, "http://127.0.0.1:5001"),
            (ADMIN_PUBLIC_KEYS_ENV, " BC1a , ,BC1b"),
            (PLATFORM_PUBLIC_KEY_HEX_ENV, &"AB".repeat(33)),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.issuance.free_tier_recipients, 10);
        assert_eq!(cfg.endpoints.timeout, Some(Duration::from_secs(15)));
        assert!(cfg.endpoints.ipfs_api_url.is_some());
        assert_eq!(cfg.admin_public_keys, vec!["BC1a", "BC1b"]);
        assert_eq!(cfg.issuance.platform_public_key_hex, "ab".repeat(33));
    }

    #[test]
    fn invalid_values_fail() {
        assert!(matches!(
            load(&[(NANOS_PER_RECIPIENT_ENV, "lots")]),
            Err(ConfigError::Invalid { name: NANOS_PER_RECIPIENT_ENV, .. })
        ));
        assert!(load(&[(CHAIN_API_URL_ENV, "not a url")]).is_err());
        assert!(load(&[(PLATFORM_PUBLIC_KEY_HEX_ENV, "02ab")]).is_err());
        assert!(matches!(
            load(&[(TLS_CERT_PATH_ENV, "/cert.pem")]),
            Err(ConfigError::Incomplete(..))
        ));
    }

    #[test]
    fn required_payment_counts_only_paid_recipients() {
        let cfg = IssuanceConfig::default();
        assert_eq!(cfg.required_payment(0), 0);
        assert_eq!(cfg.required_payment(25), 0);
        assert_eq!(cfg.required_payment(26), 5_000_000);
        assert_eq!(cfg.required_payment(30), 25_000_000);
        assert!(!cfg.requires_payment(25));
        assert!(cfg.requires_payment(26));
    }
}
