// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Document store abstraction.
//!
//! Documents are JSON objects addressed by a slash-separated [`DocPath`]
//! (`users/{id}`, `badges/{id}`, `users/{id}/collections/{name}`). The store
//! offers whole-document reads and writes plus field-level updates that are
//! applied atomically to a single document:
//!
//! - `ArrayUnion` / `ArrayRemove` for set-like array fields
//! - `Increment` for counters
//! - `Set` / `Delete` for scalar side fields
//!
//! There are no multi-document transactions. Callers that touch several
//! documents must handle partial failure themselves.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::paths::DocPath;

/// A stored document.
pub type Document = Map<String, Value>;

/// Errors raised by document store operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    #[error("precondition failed on {path}: {reason}")]
    PreconditionFailed { path: String, reason: String },

    #[error("invalid document key: {0}")]
    InvalidKey(String),

    #[error("document is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Backend(String),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// A single field mutation applied as part of an atomic update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Append each value not already present.
    ArrayUnion(String, Vec<Value>),
    /// Remove every element equal to one of the values.
    ArrayRemove(String, Vec<Value>),
    /// Add to a numeric field (missing or non-numeric fields start at zero).
    Increment(String, i64),
    /// Overwrite a field.
    Set(String, Value),
    /// Remove a field.
    Delete(String),
}

impl FieldOp {
    pub fn union(field: &str, value: impl Into<Value>) -> Self {
        FieldOp::ArrayUnion(field.to_string(), vec![value.into()])
    }

    pub fn remove(field: &str, value: impl Into<Value>) -> Self {
        FieldOp::ArrayRemove(field.to_string(), vec![value.into()])
    }

    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        FieldOp::Set(field.to_string(), value.into())
    }

    pub fn delete(field: &str) -> Self {
        FieldOp::Delete(field.to_string())
    }
}

/// Condition checked inside the same write as an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    /// The array field must contain the value.
    ArrayContains { field: String, value: Value },
}

impl Precondition {
    pub fn array_contains(field: &str, value: impl Into<Value>) -> Self {
        Precondition::ArrayContains {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Evaluate against a document.
    pub fn holds(&self, doc: &Document) -> bool {
        match self {
            Precondition::ArrayContains { field, value } => array_contains(doc, field, value),
        }
    }

    fn describe(&self) -> String {
        match self {
            Precondition::ArrayContains { field, value } => {
                format!("{field} does not contain {value}")
            }
        }
    }
}

/// Collection query filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals { field: String, value: Value },
    ArrayContains { field: String, value: Value },
}

impl Filter {
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Filter::Equals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn array_contains(field: &str, value: impl Into<Value>) -> Self {
        Filter::ArrayContains {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Equals { field, value } => doc.get(field) == Some(value),
            Filter::ArrayContains { field, value } => array_contains(doc, field, value),
        }
    }
}

fn array_contains(doc: &Document, field: &str, value: &Value) -> bool {
    doc.get(field)
        .and_then(Value::as_array)
        .is_some_and(|items| items.contains(value))
}

/// Apply field operations to a document in order.
///
/// The precondition is evaluated before any operation; on failure the
/// document is left untouched.
pub fn apply_update(
    path: &DocPath,
    doc: &mut Document,
    ops: &[FieldOp],
    precondition: Option<&Precondition>,
) -> DocumentResult<()> {
    if let Some(pre) = precondition {
        if !pre.holds(doc) {
            return Err(DocumentError::PreconditionFailed {
                path: path.to_string(),
                reason: pre.describe(),
            });
        }
    }

    for op in ops {
        match op {
            FieldOp::ArrayUnion(field, values) => {
                let items = array_field(doc, field);
                for value in values {
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                }
            }
            FieldOp::ArrayRemove(field, values) => {
                let items = array_field(doc, field);
                items.retain(|item| !values.contains(item));
            }
            FieldOp::Increment(field, delta) => {
                let current = doc.get(field).and_then(Value::as_i64).unwrap_or(0);
                doc.insert(field.clone(), Value::from(current.saturating_add(*delta)));
            }
            FieldOp::Set(field, value) => {
                doc.insert(field.clone(), value.clone());
            }
            FieldOp::Delete(field) => {
                doc.remove(field);
            }
        }
    }

    Ok(())
}

/// Borrow an array field, replacing missing or non-array values with `[]`.
fn array_field<'a>(doc: &'a mut Document, field: &str) -> &'a mut Vec<Value> {
    let slot = doc
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was normalized to an array"),
    }
}

/// Convert a serializable value into a document.
pub fn to_document<T: serde::Serialize>(path: &DocPath, value: &T) -> DocumentResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(DocumentError::NotAnObject(path.to_string())),
    }
}

/// Deserialize a document into a typed value.
pub fn from_document<T: serde::de::DeserializeOwned>(doc: Document) -> DocumentResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Keyed JSON document store.
///
/// Every method touches exactly one document (or reads one collection), and
/// each write is atomic with respect to concurrent writes on the same key.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document.
    async fn get(&self, path: &DocPath) -> DocumentResult<Option<Document>>;

    /// Write a document, replacing any existing one.
    async fn set(&self, path: &DocPath, doc: Document) -> DocumentResult<()>;

    /// Write a document only if the key is free.
    ///
    /// Returns `DocumentError::AlreadyExists` otherwise.
    async fn create(&self, path: &DocPath, doc: Document) -> DocumentResult<()>;

    /// Apply field operations to an existing document.
    ///
    /// Returns `DocumentError::NotFound` if the document is missing and
    /// `DocumentError::PreconditionFailed` if the precondition does not hold.
    async fn update(
        &self,
        path: &DocPath,
        ops: Vec<FieldOp>,
        precondition: Option<Precondition>,
    ) -> DocumentResult<()>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, path: &DocPath) -> DocumentResult<()>;

    /// List the direct children of a collection ordered by key, optionally
    /// filtered. Documents in nested sub-collections are not included.
    async fn query(
        &self,
        collection: &str,
        filter: Option<Filter>,
    ) -> DocumentResult<Vec<(String, Document)>>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> DocumentResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn path() -> DocPath {
        DocPath::user("alice").unwrap()
    }

    #[test]
    fn array_union_skips_existing_values() {
        let mut d = doc(json!({ "badgesPending": ["a"] }));
        apply_update(
            &path(),
            &mut d,
            &[FieldOp::ArrayUnion(
                "badgesPending".into(),
                vec![json!("a"), json!("b")],
            )],
            None,
        )
        .unwrap();
        assert_eq!(d["badgesPending"], json!(["a", "b"]));
    }

    #[test]
    fn array_union_creates_missing_field() {
        let mut d = Document::new();
        apply_update(&path(), &mut d, &[FieldOp::union("badgesIssued", "x")], None).unwrap();
        assert_eq!(d["badgesIssued"], json!(["x"]));
    }

    #[test]
    fn array_remove_drops_all_matches() {
        let mut d = doc(json!({ "tags": ["a", "b", "a"] }));
        apply_update(&path(), &mut d, &[FieldOp::remove("tags", "a")], None).unwrap();
        assert_eq!(d["tags"], json!(["b"]));
    }

    #[test]
    fn increment_set_and_delete() {
        let mut d = doc(json!({ "count": 2, "dateAccepted": 5 }));
        apply_update(
            &path(),
            &mut d,
            &[
                FieldOp::Increment("count".into(), 3),
                FieldOp::set("title", "x"),
                FieldOp::delete("dateAccepted"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(d["count"], json!(5));
        assert_eq!(d["title"], json!("x"));
        assert!(!d.contains_key("dateAccepted"));
    }

    #[test]
    fn failed_precondition_leaves_document_untouched() {
        let mut d = doc(json!({ "badgesPending": ["a"], "badgesAccepted": [] }));
        let before = d.clone();
        let result = apply_update(
            &path(),
            &mut d,
            &[
                FieldOp::remove("badgesPending", "z"),
                FieldOp::union("badgesAccepted", "z"),
            ],
            Some(&Precondition::array_contains("badgesPending", "z")),
        );
        assert!(matches!(result, Err(DocumentError::PreconditionFailed { .. })));
        assert_eq!(d, before);
    }

    #[test]
    fn filters_match_fields() {
        let d = doc(json!({ "issuer": "alice", "recipients": ["bob"] }));
        assert!(Filter::equals("issuer", "alice").matches(&d));
        assert!(!Filter::equals("issuer", "bob").matches(&d));
        assert!(Filter::array_contains("recipients", "bob").matches(&d));
        assert!(!Filter::array_contains("issuer", "alice").matches(&d));
    }
}
