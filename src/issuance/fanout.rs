// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recipient fan-out.
//!
//! Records a new badge on every recipient (received + pending) and on the
//! issuer (issued). Recipient records are read concurrently first so that
//! absent users are created from the blank template in one write; all
//! writes then run concurrently and are joined.

use futures::future::join_all;

use crate::storage::{DocumentError, UserRepository};

/// Identities whose user-record reads or writes failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutFailure {
    pub failed: Vec<String>,
    pub reason: String,
}

impl FanoutFailure {
    fn from_errors(errors: Vec<(String, DocumentError)>) -> Self {
        let reason = errors
            .iter()
            .map(|(identity, e)| format!("{identity}: {e}"))
            .collect::<Vec<_>>()
            .join("; ");
        let mut failed: Vec<String> = Vec::with_capacity(errors.len());
        for (identity, _) in errors {
            if !failed.contains(&identity) {
                failed.push(identity);
            }
        }
        Self { failed, reason }
    }
}

/// Record `badge_id` on `issuer` and every recipient.
pub async fn fan_out(
    users: &UserRepository<'_>,
    badge_id: &str,
    issuer: &str,
    recipients: &[String],
) -> Result<(), FanoutFailure> {
    let reads = join_all(recipients.iter().map(|r| users.get(r))).await;

    let mut existing = Vec::with_capacity(recipients.len());
    let mut errors = Vec::new();
    for (recipient, read) in recipients.iter().zip(reads) {
        match read {
            Ok(user) => existing.push((recipient, user.is_some())),
            Err(e) => errors.push((recipient.clone(), e)),
        }
    }
    if !errors.is_empty() {
        return Err(FanoutFailure::from_errors(errors));
    }

    let recipient_writes = join_all(existing.into_iter().map(|(recipient, exists)| async move {
        let result = if exists {
            users.add_received(recipient, badge_id).await
        } else {
            users.create_recipient(recipient, badge_id).await
        };
        (recipient.clone(), result)
    }));
    let issuer_write = users.add_issued(issuer, badge_id);

    let (recipient_results, issuer_result) = futures::join!(recipient_writes, issuer_write);

    let mut errors: Vec<(String, DocumentError)> = recipient_results
        .into_iter()
        .filter_map(|(identity, result)| result.err().map(|e| (identity, e)))
        .collect();
    if let Err(e) = issuer_result {
        errors.push((issuer.to_string(), e));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(FanoutFailure::from_errors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::document::DocumentStore;
    use crate::testing::{temp_store, FailingStore, FailOn};

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn new_and_existing_recipients_get_the_badge_once() {
        let (_dir, store) = temp_store();
        let users = UserRepository::new(&store);
        users.create_recipient("bob", "old").await.unwrap();

        fan_out(&users, "Qm1", "alice", &ids(&["bob", "carol"]))
            .await
            .unwrap();

        for name in ["bob", "carol"] {
            let user = users.get(name).await.unwrap().unwrap();
            assert_eq!(user.badges_received.iter().filter(|b| *b == "Qm1").count(), 1);
            assert_eq!(user.badges_pending.iter().filter(|b| *b == "Qm1").count(), 1);
        }
        let bob = users.get("bob").await.unwrap().unwrap();
        assert_eq!(bob.badges_pending, vec!["old", "Qm1"]);

        let alice = users.get("alice").await.unwrap().unwrap();
        assert_eq!(alice.badges_issued, vec!["Qm1"]);
        assert!(alice.badges_pending.is_empty());
    }

    #[tokio::test]
    async fn self_issued_badge() {
        let (_dir, store) = temp_store();
        let users = UserRepository::new(&store);

        fan_out(&users, "Qm1", "alice", &ids(&["alice"])).await.unwrap();

        let alice = users.get("alice").await.unwrap().unwrap();
        assert_eq!(alice.badges_issued, vec!["Qm1"]);
        assert_eq!(alice.badges_received, vec!["Qm1"]);
        assert_eq!(alice.badges_pending, vec!["Qm1"]);
    }

    #[tokio::test]
    async fn failed_writes_are_named() {
        let (_dir, inner) = temp_store();
        let store = FailingStore::new(inner).fail("users/carol", FailOn::Write);
        let users = UserRepository::new(&store);

        let failure = fan_out(&users, "Qm1", "alice", &ids(&["bob", "carol"]))
            .await
            .unwrap_err();
        assert_eq!(failure.failed, vec!["carol"]);
        assert!(failure.reason.contains("carol"));

        let bob = users.get("bob").await.unwrap().unwrap();
        assert_eq!(bob.badges_pending, vec!["Qm1"]);
        assert!(store.get(&crate::storage::DocPath::user("carol").unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_reads_skip_all_writes() {
        let (_dir, inner) = temp_store();
        let store = FailingStore::new(inner).fail("users/bob", FailOn::Read);
        let users = UserRepository::new(&store);

        let failure = fan_out(&users, "Qm1", "alice", &ids(&["bob", "carol"]))
            .await
            .unwrap_err();
        assert_eq!(failure.failed, vec!["bob"]);
        assert!(users.get("carol").await.unwrap().is_none());
        assert!(users.get("alice").await.unwrap().is_none());
    }
}
