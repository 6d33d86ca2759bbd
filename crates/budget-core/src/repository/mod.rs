//! Repository over the local and remote stores.
//!
//! Writes go to the local store first and synchronously; the remote copy is
//! a best-effort mirror started afterwards. Reads only ever touch the local
//! store and come back as [`LiveQuery`] values that refresh on commit.

mod entity;
mod mirror;
mod seed;
mod sync;

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;

use crate::error::{BudgetError, Result};
use crate::remote::documents::{
    document_id, profile_from_document, profile_to_document, to_document,
};
use crate::remote::{Collection, RemoteError, RemoteStore};
use crate::storage::{
    Budget, Category, DateRange, LiveQuery, LocalStore, SumQuery, Table, Transaction,
    TransactionFilter, UserProfile,
};

pub use entity::Entity;
pub use mirror::{MirrorHandle, MirrorOutcome, Mirrored};
pub use seed::{default_categories, DEFAULT_OWNER, INCOME_CATEGORY_ID};
pub use sync::{EntitySyncCounts, SyncReport};

/// Local-first repository with an optional remote mirror.
pub struct Repository<S> {
    local: Arc<S>,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl<S> Clone for Repository<S> {
    fn clone(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            remote: self.remote.clone(),
        }
    }
}

impl<S: LocalStore + 'static> Repository<S> {
    /// Repository that never talks to a remote store.
    pub fn local_only(local: Arc<S>) -> Self {
        Self {
            local,
            remote: None,
        }
    }

    pub fn new(local: Arc<S>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            local,
            remote: Some(remote),
        }
    }

    pub fn local(&self) -> &Arc<S> {
        &self.local
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn mirror_target(&self, owner: &str) -> Option<Arc<dyn RemoteStore>> {
        if owner.is_empty() {
            return None;
        }
        self.remote.clone()
    }

    fn mirror_save<E: Entity>(&self, owner: &str, record: &E) -> MirrorHandle {
        let Some(remote) = self.mirror_target(owner) else {
            return MirrorHandle::skipped();
        };
        let data = match to_document(record) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!("Cannot encode {} {}: {}", E::COLLECTION.name(), record.id(), err);
                return MirrorHandle::skipped();
            }
        };

        let what = format!("{} {}", E::COLLECTION.name(), record.id());
        match document_id(record.id()) {
            Some(id) => MirrorHandle::spawn(what, async move {
                remote.set(E::COLLECTION, &id, data).await
            }),
            None => MirrorHandle::spawn(what, async move {
                remote.add(E::COLLECTION, data).await.map(|_| ())
            }),
        }
    }

    // --- Writes ---

    /// Insert `record` locally and mirror it under the owner.
    ///
    /// A zero id is generated by the local store; an explicit id replaces
    /// any existing row. The returned record carries the resolved id.
    pub fn insert<E: Entity>(&self, owner: &str, mut record: E) -> Result<Mirrored<E>> {
        let id = record.insert_local(self.local.as_ref())?;
        record.set_id(id);
        let mirror = self.mirror_save(owner, &record);
        Ok(Mirrored { record, mirror })
    }

    /// Replace the row with `record`'s id and mirror the full record.
    ///
    /// Unknown ids change nothing locally but are still mirrored.
    pub fn update<E: Entity>(&self, owner: &str, record: E) -> Result<Mirrored<E>> {
        let changed = record.update_local(self.local.as_ref())?;
        if changed == 0 {
            tracing::debug!(
                "Update of unknown {} {} changed no local rows",
                E::COLLECTION.name(),
                record.id()
            );
        }
        let mirror = self.mirror_save(owner, &record);
        Ok(Mirrored { record, mirror })
    }

    /// Delete `record` locally and remove its remote document.
    pub fn delete<E: Entity>(&self, owner: &str, record: &E) -> Result<MirrorHandle> {
        E::delete_local(self.local.as_ref(), record.id())?;

        let Some(remote) = self.mirror_target(owner) else {
            return Ok(MirrorHandle::skipped());
        };
        let id = record.id().to_string();
        let what = format!("delete of {} {}", E::COLLECTION.name(), id);
        Ok(MirrorHandle::spawn(what, async move {
            remote.delete(E::COLLECTION, &id).await
        }))
    }

    /// Fetch one record by id.
    pub fn get<E: Entity>(&self, id: i64) -> Result<Option<E>> {
        E::get_local(self.local.as_ref(), id)
    }

    /// Fetch one record by id, failing when it does not exist.
    pub fn require<E: Entity>(&self, id: i64) -> Result<E> {
        self.get(id)?.ok_or_else(|| {
            BudgetError::NotFound(format!("{} {}", E::COLLECTION.name(), id))
        })
    }

    // --- Transaction queries ---

    /// Live queries hold the store weakly so they never keep it open.
    fn live<T, F>(&self, table: Table, query: F) -> LiveQuery<T>
    where
        T: Send + 'static,
        F: Fn(&S) -> Result<T> + Send + Sync + 'static,
    {
        let local: Weak<S> = Arc::downgrade(&self.local);
        LiveQuery::new(self.local.subscribe(table), move || {
            let store = local.upgrade().ok_or_else(|| {
                BudgetError::Storage("Local store was closed".to_string())
            })?;
            query(store.as_ref())
        })
    }

    /// An owner's transactions, newest first.
    pub fn transactions(&self, owner: &str, filter: TransactionFilter) -> LiveQuery<Vec<Transaction>> {
        let owner = owner.to_string();
        self.live(Table::Transactions, move |store| {
            store.list_transactions(&owner, &filter)
        })
    }

    pub fn sum_amount(&self, owner: &str, query: SumQuery) -> LiveQuery<Decimal> {
        let owner = owner.to_string();
        self.live(Table::Transactions, move |store| store.sum_amount(&owner, &query))
    }

    pub fn total_income(&self, owner: &str) -> LiveQuery<Decimal> {
        self.sum_amount(owner, SumQuery::income())
    }

    pub fn total_expenses(&self, owner: &str) -> LiveQuery<Decimal> {
        self.sum_amount(owner, SumQuery::expenses())
    }

    /// Expenses for one category within `range`.
    pub fn category_expense(
        &self,
        owner: &str,
        category_id: i64,
        range: DateRange,
    ) -> LiveQuery<Decimal> {
        self.sum_amount(owner, SumQuery::expenses().category(category_id).range(range))
    }

    // --- Budget queries ---

    pub fn budgets(&self, owner: &str) -> LiveQuery<Vec<Budget>> {
        let owner = owner.to_string();
        self.live(Table::Budgets, move |store| store.list_budgets(&owner))
    }

    pub fn budgets_for_month(&self, owner: &str, month: u32, year: i32) -> LiveQuery<Vec<Budget>> {
        let owner = owner.to_string();
        self.live(Table::Budgets, move |store| {
            store.budgets_for_month(&owner, month, year)
        })
    }

    pub fn budgets_for_current_month(&self, owner: &str) -> LiveQuery<Vec<Budget>> {
        let now = Utc::now();
        self.budgets_for_month(owner, now.month(), now.year())
    }

    pub fn budget_for_category(
        &self,
        owner: &str,
        category_id: i64,
        month: u32,
        year: i32,
    ) -> LiveQuery<Option<Budget>> {
        let owner = owner.to_string();
        self.live(Table::Budgets, move |store| {
            store.budget_for_category(&owner, category_id, month, year)
        })
    }

    pub fn total_budget_for_month(&self, owner: &str, month: u32, year: i32) -> LiveQuery<Decimal> {
        let owner = owner.to_string();
        self.live(Table::Budgets, move |store| {
            store.total_budget_for_month(&owner, month, year)
        })
    }

    // --- Category queries ---

    /// Categories visible to the owner, by name.
    pub fn categories(&self, owner: &str) -> LiveQuery<Vec<Category>> {
        let owner = owner.to_string();
        self.live(Table::Categories, move |store| store.list_categories(&owner))
    }

    pub fn category(&self, id: i64) -> LiveQuery<Option<Category>> {
        self.live(Table::Categories, move |store| store.get_category(id))
    }

    /// Visible categories keyed by id.
    pub fn category_map(&self, owner: &str) -> LiveQuery<HashMap<i64, Category>> {
        self.categories(owner).map(|categories| {
            categories
                .into_iter()
                .map(|category| (category.id, category))
                .collect()
        })
    }

    // --- Profiles ---

    fn require_remote(&self) -> Result<&Arc<dyn RemoteStore>> {
        self.remote.as_ref().ok_or_else(|| {
            RemoteError::Unavailable("no remote store configured".to_string()).into()
        })
    }

    /// The owner's profile, straight from the remote `users` collection.
    pub async fn fetch_profile(&self, owner: &str) -> Result<Option<UserProfile>> {
        let remote = self.require_remote()?;
        let Some(doc) = remote.get(Collection::Users, owner).await? else {
            return Ok(None);
        };
        Ok(Some(profile_from_document(&doc)?))
    }

    /// Overwrite the profile document keyed by `profile.id`.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        if profile.id.is_empty() {
            return Err(BudgetError::InvalidInput(
                "Profile needs an owner id".to_string(),
            ));
        }
        let remote = self.require_remote()?;
        remote
            .set(Collection::Users, &profile.id, profile_to_document(profile)?)
            .await?;
        Ok(())
    }
}
