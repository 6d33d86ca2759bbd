//! One-way pull sync from the remote store.
//!
//! Remote records are upserted into the local store: an existing local id is
//! updated in place, anything else is inserted. Nothing is pushed back and
//! nothing local is deleted. A record that fails to decode or write is
//! logged and counted, and the pull moves on.

use chrono::{Datelike, Utc};
use tokio::task::JoinHandle;

use super::{Entity, Repository};
use crate::identity::IdentityProvider;
use crate::remote::documents::from_document;
use crate::remote::{Collection, Direction, Document, DocumentQuery, RemoteResult, RemoteStore};
use crate::storage::{Budget, Category, LocalStore, Transaction, UNASSIGNED_ID};

/// Field holding the owner in every remote document.
const OWNER_FIELD: &str = "ownerId";

/// Per-collection outcome of a pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntitySyncCounts {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

impl EntitySyncCounts {
    pub fn applied(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Result of [`Repository::sync_from_remote`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// True when no pull was attempted (no owner or no remote).
    pub skipped: bool,
    pub transactions: EntitySyncCounts,
    pub budgets: EntitySyncCounts,
    pub categories: EntitySyncCounts,
    /// Top-level failure that cut the pull short. Records applied before it
    /// stay applied.
    pub error: Option<String>,
}

impl SyncReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.skipped && self.error.is_none()
    }

    pub fn failed(&self) -> usize {
        self.transactions.failed + self.budgets.failed + self.categories.failed
    }
}

enum Upsert {
    Inserted,
    Updated,
}

impl<S: LocalStore + 'static> Repository<S> {
    /// Pull every remote record for `owner` into the local store.
    ///
    /// Transactions come first (newest first), then budgets for the current
    /// month, then the owner's categories. Never fails: problems are logged
    /// and recorded in the report.
    pub async fn sync_from_remote(&self, owner: &str) -> SyncReport {
        if owner.is_empty() {
            tracing::debug!("No owner; skipping sync");
            return SyncReport::skipped();
        }
        let Some(remote) = self.remote.clone() else {
            tracing::debug!("No remote store; skipping sync");
            return SyncReport::skipped();
        };

        let mut report = SyncReport::default();
        if let Err(err) = self.pull(remote.as_ref(), owner, &mut report).await {
            tracing::error!("Error syncing data for {}: {}", owner, err);
            report.error = Some(err.to_string());
        }

        tracing::debug!(
            "Sync for {}: {} transactions, {} budgets, {} categories applied; {} failed",
            owner,
            report.transactions.applied(),
            report.budgets.applied(),
            report.categories.applied(),
            report.failed()
        );
        report
    }

    /// Run [`Repository::sync_from_remote`] on a background task.
    pub fn spawn_sync(&self, owner: impl Into<String>) -> JoinHandle<SyncReport> {
        let repo = self.clone();
        let owner = owner.into();
        tokio::spawn(async move { repo.sync_from_remote(&owner).await })
    }

    /// Sync every time `identity` reports a signed-in owner, starting with
    /// the owner signed in right now. The task ends when the identity
    /// provider is dropped.
    pub fn spawn_login_sync(&self, identity: &dyn IdentityProvider) -> JoinHandle<()> {
        let repo = self.clone();
        let mut auth = identity.subscribe();
        tokio::spawn(async move {
            loop {
                let owner = auth.borrow_and_update().clone();
                if let Some(owner) = owner {
                    repo.sync_from_remote(&owner).await;
                }
                if auth.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    async fn pull(
        &self,
        remote: &dyn RemoteStore,
        owner: &str,
        report: &mut SyncReport,
    ) -> RemoteResult<()> {
        let query = DocumentQuery::new()
            .where_eq(OWNER_FIELD, owner)
            .order_by("date", Direction::Descending)
            .order_by_id(Direction::Descending);
        let docs = remote.query(Collection::Transactions, &query).await?;
        report.transactions = self.apply::<Transaction>(&docs, owner);

        let now = Utc::now();
        let query = DocumentQuery::new()
            .where_eq(OWNER_FIELD, owner)
            .where_eq("month", now.month())
            .where_eq("year", now.year());
        let docs = remote.query(Collection::Budgets, &query).await?;
        report.budgets = self.apply::<Budget>(&docs, owner);

        let query = DocumentQuery::new().where_eq(OWNER_FIELD, owner);
        let docs = remote.query(Collection::Categories, &query).await?;
        report.categories = self.apply::<Category>(&docs, owner);

        Ok(())
    }

    fn apply<E: Entity>(&self, docs: &[Document], owner: &str) -> EntitySyncCounts {
        let mut counts = EntitySyncCounts::default();
        for doc in docs {
            let mut record: E = match from_document(doc) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!("Skipping remote {}: {}", E::COLLECTION.name(), err);
                    counts.failed += 1;
                    continue;
                }
            };
            record.set_owner(owner);

            match self.upsert_local(&record) {
                Ok(Upsert::Inserted) => counts.inserted += 1,
                Ok(Upsert::Updated) => counts.updated += 1,
                Err(err) => {
                    tracing::warn!(
                        "Failed to apply remote {} {}: {}",
                        E::COLLECTION.name(),
                        doc.id,
                        err
                    );
                    counts.failed += 1;
                }
            }
        }
        counts
    }

    fn upsert_local<E: Entity>(&self, record: &E) -> crate::error::Result<Upsert> {
        let local = self.local.as_ref();
        if record.id() != UNASSIGNED_ID && E::get_local(local, record.id())?.is_some() {
            record.update_local(local)?;
            return Ok(Upsert::Updated);
        }
        record.insert_local(local)?;
        Ok(Upsert::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionIdentity;
    use crate::remote::MemoryRemoteStore;
    use crate::storage::{SqliteStore, TransactionFilter};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Arc;

    fn repo() -> (Repository<SqliteStore>, Arc<MemoryRemoteStore>) {
        let local = Arc::new(SqliteStore::open_in_memory().unwrap());
        let remote = Arc::new(MemoryRemoteStore::new());
        (Repository::new(local, remote.clone()), remote)
    }

    #[tokio::test]
    async fn test_empty_owner_skips() {
        let (repo, _remote) = repo();
        let report = repo.sync_from_remote("").await;
        assert!(report.skipped);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_offline_remote_is_reported_not_raised() {
        let (repo, remote) = repo();
        remote.set_offline(true);

        let report = repo.sync_from_remote("u1").await;
        assert!(report.error.is_some());
        assert_eq!(report.transactions, EntitySyncCounts::default());
    }

    #[tokio::test]
    async fn test_bad_document_is_counted_and_skipped() {
        let (repo, remote) = repo();
        let date = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        remote
            .set(
                Collection::Transactions,
                "1",
                json!({"ownerId": "u1", "date": date.timestamp_millis(), "description": "no amount"}),
            )
            .await
            .unwrap();
        remote
            .set(
                Collection::Transactions,
                "2",
                json!({
                    "id": 2, "ownerId": "u1", "amount": 9.5, "description": "ok",
                    "date": date.timestamp_millis(), "categoryId": 1, "isIncome": false
                }),
            )
            .await
            .unwrap();

        let report = repo.sync_from_remote("u1").await;
        assert!(report.is_complete());
        assert_eq!(report.transactions.failed, 1);
        assert_eq!(report.transactions.inserted, 1);

        let local = repo
            .transactions("u1", TransactionFilter::new())
            .current()
            .unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].amount, dec!(9.5));
    }

    #[tokio::test]
    async fn test_login_sync_pulls_on_sign_in() {
        let (repo, remote) = repo();
        let now = Utc::now();
        remote
            .set(
                Collection::Budgets,
                "4",
                json!({
                    "id": 4, "ownerId": "u1", "amount": 250.0, "categoryId": 1,
                    "month": now.month(), "year": now.year()
                }),
            )
            .await
            .unwrap();

        let session = SessionIdentity::signed_out();
        let mut budgets = repo.budgets("u1");
        let task = repo.spawn_login_sync(&session);

        session.sign_in("u1");
        let synced = budgets.changed().await.unwrap();
        assert_eq!(synced.len(), 1);
        assert_eq!(synced[0].id, 4);

        drop(session);
        task.await.unwrap();
    }
}
