// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `documents`: document path → JSON object bytes
//!
//! Sub-collections share the table; `users/alice/collections/x` sorts right
//! after `users/alice`. Collection queries are range scans over the
//! `{collection}/` prefix that skip keys containing a further `/`.
//!
//! Every mutation runs in its own write transaction. redb serializes write
//! transactions, so a read-modify-write on one key never interleaves with
//! another write.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::document::{
    apply_update, Document, DocumentError, DocumentResult, DocumentStore, FieldOp, Filter,
    Precondition,
};
use super::paths::DocPath;

const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

// =============================================================================
// redb error mapping
// =============================================================================

impl From<redb::Error> for DocumentError {
    fn from(e: redb::Error) -> Self {
        DocumentError::Backend(format!("redb error: {e}"))
    }
}

impl From<redb::DatabaseError> for DocumentError {
    fn from(e: redb::DatabaseError) -> Self {
        DocumentError::Backend(format!("redb database error: {e}"))
    }
}

impl From<redb::TransactionError> for DocumentError {
    fn from(e: redb::TransactionError) -> Self {
        DocumentError::Backend(format!("redb transaction error: {e}"))
    }
}

impl From<redb::TableError> for DocumentError {
    fn from(e: redb::TableError) -> Self {
        DocumentError::Backend(format!("redb table error: {e}"))
    }
}

impl From<redb::StorageError> for DocumentError {
    fn from(e: redb::StorageError) -> Self {
        DocumentError::Backend(format!("redb storage error: {e}"))
    }
}

impl From<redb::CommitError> for DocumentError {
    fn from(e: redb::CommitError) -> Self {
        DocumentError::Backend(format!("redb commit error: {e}"))
    }
}

// =============================================================================
// RedbDocumentStore
// =============================================================================

/// Document store over a single redb file.
#[derive(Clone)]
pub struct RedbDocumentStore {
    db: Arc<Database>,
}

impl RedbDocumentStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> DocumentResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DocumentError::Backend(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so read transactions never see it missing
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DOCUMENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Run a blocking database closure off the async runtime.
    async fn run<T, F>(&self, f: F) -> DocumentResult<T>
    where
        F: FnOnce(&Database) -> DocumentResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| DocumentError::Backend(format!("database task failed: {e}")))?
    }
}

fn decode(bytes: &[u8]) -> DocumentResult<Document> {
    Ok(serde_json::from_slice(bytes)?)
}

fn read_document(db: &Database, key: &str) -> DocumentResult<Option<Document>> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(DOCUMENTS)?;
    match table.get(key)? {
        Some(value) => Ok(Some(decode(value.value())?)),
        None => Ok(None),
    }
}

fn write_document(db: &Database, key: &str, doc: &Document, must_be_new: bool) -> DocumentResult<()> {
    let json = serde_json::to_vec(doc)?;
    let write_txn = db.begin_write()?;
    {
        let mut table = write_txn.open_table(DOCUMENTS)?;
        if must_be_new && table.get(key)?.is_some() {
            return Err(DocumentError::AlreadyExists(key.to_string()));
        }
        table.insert(key, json.as_slice())?;
    }
    write_txn.commit()?;
    Ok(())
}

fn update_document(
    db: &Database,
    path: &DocPath,
    ops: &[FieldOp],
    precondition: Option<&Precondition>,
) -> DocumentResult<()> {
    let key = path.as_str();
    let write_txn = db.begin_write()?;
    {
        let mut table = write_txn.open_table(DOCUMENTS)?;

        let existing_bytes = {
            let existing = table
                .get(key)?
                .ok_or_else(|| DocumentError::NotFound(key.to_string()))?;
            existing.value().to_vec()
        };

        let mut doc = decode(&existing_bytes)?;
        apply_update(path, &mut doc, ops, precondition)?;

        let json = serde_json::to_vec(&doc)?;
        table.insert(key, json.as_slice())?;
    }
    write_txn.commit()?;
    Ok(())
}

fn delete_document(db: &Database, key: &str) -> DocumentResult<()> {
    let write_txn = db.begin_write()?;
    {
        let mut table = write_txn.open_table(DOCUMENTS)?;
        table.remove(key)?;
    }
    write_txn.commit()?;
    Ok(())
}

fn scan_collection(
    db: &Database,
    collection: &str,
    filter: Option<&Filter>,
) -> DocumentResult<Vec<(String, Document)>> {
    // '0' is the byte after '/', so [prefix, end) covers every key under prefix
    let prefix = format!("{collection}/");
    let end = format!("{collection}0");

    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(DOCUMENTS)?;

    let mut results = Vec::new();
    for entry in table.range(prefix.as_str()..end.as_str())? {
        let (key, value) = entry?;
        let key = key.value();
        let id = &key[prefix.len()..];
        if id.contains('/') {
            continue;
        }
        let doc = decode(value.value())?;
        if filter.is_none_or(|f| f.matches(&doc)) {
            results.push((id.to_string(), doc));
        }
    }
    Ok(results)
}

#[async_trait]
impl DocumentStore for RedbDocumentStore {
    async fn get(&self, path: &DocPath) -> DocumentResult<Option<Document>> {
        let key = path.as_str().to_string();
        self.run(move |db| read_document(db, &key)).await
    }

    async fn set(&self, path: &DocPath, doc: Document) -> DocumentResult<()> {
        let key = path.as_str().to_string();
        self.run(move |db| write_document(db, &key, &doc, false)).await
    }

    async fn create(&self, path: &DocPath, doc: Document) -> DocumentResult<()> {
        let key = path.as_str().to_string();
        self.run(move |db| write_document(db, &key, &doc, true)).await
    }

    async fn update(
        &self,
        path: &DocPath,
        ops: Vec<FieldOp>,
        precondition: Option<Precondition>,
    ) -> DocumentResult<()> {
        let path = path.clone();
        self.run(move |db| update_document(db, &path, &ops, precondition.as_ref()))
            .await
    }

    async fn delete(&self, path: &DocPath) -> DocumentResult<()> {
        let key = path.as_str().to_string();
        self.run(move |db| delete_document(db, &key)).await
    }

    async fn query(
        &self,
        collection: &str,
        filter: Option<Filter>,
    ) -> DocumentResult<Vec<(String, Document)>> {
        let collection = collection.to_string();
        self.run(move |db| scan_collection(db, &collection, filter.as_ref()))
            .await
    }

    async fn health_check(&self) -> DocumentResult<()> {
        self.run(|db| {
            let read_txn = db.begin_read()?;
            let _ = read_txn.open_table(DOCUMENTS)?;
            Ok(())
        })
        .await
    }
}
