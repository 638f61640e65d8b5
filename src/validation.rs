// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Input validation for badge, badge page and collection requests.
//!
//! Everything here is pure: no I/O, the clock is passed in. Strings are
//! trimmed before any length or format check, and lengths count Unicode
//! scalar values.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::config::IssuanceConfig;
use crate::error::ApiError;
use crate::models::{
    BadgeCollection, BadgeContent, BadgePage, CreateBadgePageRequest, CreateBadgeRequest,
    CreateCollectionRequest, OPEN_ENDED_VALID_DATE,
};
use crate::storage::paths::is_valid_segment;

/// Maximum length of titles, issuers and collection names.
pub const MAX_TEXT_LEN: usize = 80;

pub const DEFAULT_BACKGROUND_COLOR: &str = "#000000";

static COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern compiles"));

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(https?://)?",
        r"((([a-z\d]([a-z\d-]*[a-z\d])*)\.)+[a-z]{2,}|",
        r"((\d{1,3}\.){3}\d{1,3}))",
        r"(:\d+)?(/[-a-z\d%_.~+]*)*",
        r"(\?[;&a-z\d%_.~+=-]*)?",
        r"(#[-a-z\d_]*)?$",
    ))
    .expect("url pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required and must be a non-empty string")]
    Missing(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Must be at least one recipient")]
    NoRecipients,

    #[error("Recipients must be non-empty strings")]
    BlankRecipient,

    #[error("{0} is not a valid recipient identity")]
    InvalidRecipient(String),

    #[error("{0} is not a valid URL")]
    InvalidUrl(&'static str),

    #[error("backgroundColor is not a valid hex color (#RRGGBB)")]
    InvalidColor,

    #[error("{0} must be a boolean")]
    NotBoolean(&'static str),

    #[error("validDateStart and validDateEnd must be integers representing milliseconds since 1970-01-01T00:00:00Z")]
    DatesNotIntegers,

    #[error("validDateStart must be less than validDateEnd")]
    DatesOutOfOrder,

    #[error("You can not issue in someone else's name. Change issuer to your public key")]
    IssuerMismatch,
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::Missing(_) => "MISSING_FIELD",
            ValidationError::TooLong { .. } => "FIELD_TOO_LONG",
            ValidationError::NoRecipients => "NO_RECIPIENTS",
            ValidationError::BlankRecipient => "BLANK_RECIPIENT",
            ValidationError::InvalidRecipient(_) => "INVALID_RECIPIENT",
            ValidationError::InvalidUrl(_) => "INVALID_URL",
            ValidationError::InvalidColor => "INVALID_COLOR",
            ValidationError::NotBoolean(_) => "NOT_BOOLEAN",
            ValidationError::DatesNotIntegers => "INVALID_VALID_DATES",
            ValidationError::DatesOutOfOrder => "VALID_DATES_OUT_OF_ORDER",
            ValidationError::IssuerMismatch => "ISSUER_MISMATCH",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let api = match err {
            ValidationError::IssuerMismatch => ApiError::forbidden(err.to_string()),
            _ => ApiError::bad_request(err.to_string()),
        };
        api.with_code(err.error_code())
    }
}

pub fn is_color(value: &str) -> bool {
    COLOR.is_match(value)
}

pub fn is_url(value: &str) -> bool {
    URL.is_match(value)
}

/// Trimmed, non-empty string of at most [`MAX_TEXT_LEN`] characters.
pub fn required_text(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LEN,
        });
    }
    Ok(trimmed.to_string())
}

/// Trimmed string, empty when absent.
pub fn optional_text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Trimmed URL that may be empty.
pub fn optional_url(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    let url = optional_text(value);
    if !url.is_empty() && !is_url(&url) {
        return Err(ValidationError::InvalidUrl(field));
    }
    Ok(url)
}

/// Trimmed image URL, falling back to `default` when empty.
pub fn image_url_or_default(value: Option<&str>, default: &str) -> Result<String, ValidationError> {
    let url = optional_url("imageUrl", value)?;
    Ok(if url.is_empty() { default.to_string() } else { url })
}

/// Trimmed color, `#000000` when empty.
pub fn background_color(value: Option<&str>) -> Result<String, ValidationError> {
    let color = optional_text(value);
    if color.is_empty() {
        return Ok(DEFAULT_BACKGROUND_COLOR.to_string());
    }
    if !is_color(&color) {
        return Err(ValidationError::InvalidColor);
    }
    Ok(color)
}

pub fn boolean(field: &'static str, value: Option<&Value>) -> Result<bool, ValidationError> {
    value
        .and_then(Value::as_bool)
        .ok_or(ValidationError::NotBoolean(field))
}

/// Trim every recipient and drop duplicates, keeping first occurrences.
///
/// Each recipient becomes a user document key, so it must be a valid key
/// segment.
pub fn normalize_recipients(recipients: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut out: Vec<String> = Vec::with_capacity(recipients.len());
    for raw in recipients {
        let recipient = raw.trim();
        if recipient.is_empty() {
            return Err(ValidationError::BlankRecipient);
        }
        if !is_valid_segment(recipient) {
            return Err(ValidationError::InvalidRecipient(recipient.to_string()));
        }
        if !out.iter().any(|seen| seen == recipient) {
            out.push(recipient.to_string());
        }
    }
    if out.is_empty() {
        return Err(ValidationError::NoRecipients);
    }
    Ok(out)
}

/// Trim and de-duplicate a list of ids, dropping blanks.
pub fn dedupe_ids(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        if !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}

/// Integral JSON number as epoch milliseconds.
fn epoch_millis(value: Option<&Value>) -> Option<i64> {
    let number = value?.as_number()?;
    if let Some(int) = number.as_i64() {
        return Some(int);
    }
    let float = number.as_f64()?;
    (float.fract() == 0.0 && float.abs() <= OPEN_ENDED_VALID_DATE as f64).then_some(float as i64)
}

/// Validate a badge request on behalf of `caller` and build the content to
/// publish.
pub fn validate_badge_request(
    caller: &str,
    req: &CreateBadgeRequest,
    cfg: &IssuanceConfig,
    now_ms: i64,
) -> Result<BadgeContent, ValidationError> {
    let title = required_text("title", req.title.as_deref())?;
    let issuer = required_text("issuer", req.issuer.as_deref())?;
    let recipients = normalize_recipients(req.recipients.as_deref().unwrap_or_default())?;
    let description = optional_text(req.description.as_deref());
    let external_url = optional_url("externalUrl", req.external_url.as_deref())?;
    let image_url = image_url_or_default(req.image_url.as_deref(), &cfg.default_image_url)?;
    let background_color = background_color(req.background_color.as_deref())?;

    if issuer != caller {
        return Err(ValidationError::IssuerMismatch);
    }

    let valid_dates = boolean("validDates", req.valid_dates.as_ref())?;
    let (valid_date_start, valid_date_end) = if valid_dates {
        let start = epoch_millis(req.valid_date_start.as_ref());
        let end = epoch_millis(req.valid_date_end.as_ref());
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ValidationError::DatesNotIntegers);
        };
        if start >= end {
            return Err(ValidationError::DatesOutOfOrder);
        }
        (start, end)
    } else {
        (now_ms, OPEN_ENDED_VALID_DATE)
    };

    let recipients_chains = vec![cfg.chain_tag.clone(); recipients.len()];

    Ok(BadgeContent {
        title,
        issuer,
        issuer_chain: cfg.chain_tag.clone(),
        recipients,
        description,
        image_url,
        valid_dates,
        valid_date_start,
        valid_date_end,
        background_color,
        external_url,
        date_created: now_ms,
        is_visible: true,
        attributes: "{}".to_string(),
        recipients_chains,
    })
}

/// Validate a badge page listing on behalf of `caller`.
pub fn validate_badge_page(
    caller: &str,
    id: String,
    req: &CreateBadgePageRequest,
    cfg: &IssuanceConfig,
    now_ms: i64,
) -> Result<BadgePage, ValidationError> {
    let title = required_text("title", req.title.as_deref())?;
    let issuer = required_text("issuer", req.issuer.as_deref())?;
    if issuer != caller {
        return Err(ValidationError::IssuerMismatch);
    }

    Ok(BadgePage {
        id,
        title,
        issuer,
        pre_reqs: optional_text(req.pre_reqs.as_deref()),
        validity: optional_text(req.validity.as_deref()),
        description: optional_text(req.description.as_deref()),
        external_url: optional_url("externalUrl", req.external_url.as_deref())?,
        image_url: image_url_or_default(req.image_url.as_deref(), &cfg.default_image_url)?,
        background_color: background_color(req.background_color.as_deref())?,
        category: String::new(),
        date_created: now_ms,
    })
}

/// Validate the shape of a new collection. Membership of the listed badges
/// depends on the owner's record and is checked by the caller.
pub fn validate_collection(
    req: &CreateCollectionRequest,
    cfg: &IssuanceConfig,
    now_ms: i64,
) -> Result<BadgeCollection, ValidationError> {
    Ok(BadgeCollection {
        name: required_text("name", Some(&req.name))?,
        description: optional_text(req.description.as_deref()),
        image_url: image_url_or_default(req.image_url.as_deref(), &cfg.default_image_url)?,
        background_color: background_color(req.background_color.as_deref())?,
        badges: dedupe_ids(&req.badges),
        issuers: Vec::new(),
        recipients: Vec::new(),
        received_collection: boolean("receivedCollection", req.received_collection.as_ref())?,
        is_visible: true,
        date_created: now_ms,
    })
}
