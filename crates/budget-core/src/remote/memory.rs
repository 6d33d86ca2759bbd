//! In-process remote store.
//!
//! Backs tests and local-only setups. Can be switched offline to simulate
//! an unreachable service.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Collection, Document, DocumentQuery, RemoteError, RemoteResult, RemoteStore};

type Collections = HashMap<Collection, BTreeMap<String, Value>>;

#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    collections: Mutex<Collections>,
    offline: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When offline, every call fails with [`RemoteError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot of one collection, ordered by document id.
    pub fn documents(&self, collection: Collection) -> Vec<Document> {
        match self.lock() {
            Ok(collections) => collections
                .get(&collection)
                .map(|docs| {
                    docs.iter()
                        .map(|(id, data)| Document::new(id.clone(), data.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    fn lock(&self) -> RemoteResult<MutexGuard<'_, Collections>> {
        self.collections
            .lock()
            .map_err(|_| RemoteError::Unavailable("memory store poisoned".to_string()))
    }

    fn check_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("remote store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn set(&self, collection: Collection, id: &str, data: Value) -> RemoteResult<()> {
        self.check_online()?;
        self.lock()?
            .entry(collection)
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn add(&self, collection: Collection, data: Value) -> RemoteResult<String> {
        self.check_online()?;
        let id = Uuid::new_v4().simple().to_string();
        self.lock()?
            .entry(collection)
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn delete(&self, collection: Collection, id: &str) -> RemoteResult<()> {
        self.check_online()?;
        if let Some(docs) = self.lock()?.get_mut(&collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> RemoteResult<Option<Document>> {
        self.check_online()?;
        Ok(self
            .lock()?
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn query(
        &self,
        collection: Collection,
        query: &DocumentQuery,
    ) -> RemoteResult<Vec<Document>> {
        self.check_online()?;
        let mut matched: Vec<Document> = self
            .lock()?
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .filter(|doc| query.matches(doc))
                    .collect()
            })
            .unwrap_or_default();
        matched.sort_by(|a, b| query.compare(a, b));
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryRemoteStore::new();
        store
            .set(Collection::Budgets, "3", json!({"amount": 100.0}))
            .await
            .unwrap();

        let doc = store.get(Collection::Budgets, "3").await.unwrap().unwrap();
        assert_eq!(doc.data["amount"], 100.0);

        store.delete(Collection::Budgets, "3").await.unwrap();
        assert!(store.get(Collection::Budgets, "3").await.unwrap().is_none());
        store.delete(Collection::Budgets, "3").await.unwrap();
    }

    #[tokio::test]
    async fn test_add_generates_distinct_ids() {
        let store = MemoryRemoteStore::new();
        let a = store.add(Collection::Categories, json!({})).await.unwrap();
        let b = store.add(Collection::Categories, json!({})).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.documents(Collection::Categories).len(), 2);
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let store = MemoryRemoteStore::new();
        store.set_offline(true);

        let err = store
            .query(Collection::Transactions, &DocumentQuery::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));

        store.set_offline(false);
        assert!(store
            .query(Collection::Transactions, &DocumentQuery::new())
            .await
            .unwrap()
            .is_empty());
    }
}
