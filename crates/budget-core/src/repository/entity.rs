use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::remote::Collection;
use crate::storage::{Budget, Category, LocalStore, Transaction};

/// A record the repository can store locally and mirror remotely.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Remote collection holding this record type.
    const COLLECTION: Collection;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Re-home a record pulled from the remote store.
    fn set_owner(&mut self, owner: &str);

    fn insert_local<S: LocalStore + ?Sized>(&self, store: &S) -> Result<i64>;

    fn update_local<S: LocalStore + ?Sized>(&self, store: &S) -> Result<usize>;

    fn delete_local<S: LocalStore + ?Sized>(store: &S, id: i64) -> Result<usize>;

    fn get_local<S: LocalStore + ?Sized>(store: &S, id: i64) -> Result<Option<Self>>;
}

impl Entity for Transaction {
    const COLLECTION: Collection = Collection::Transactions;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn set_owner(&mut self, owner: &str) {
        self.owner_id = owner.to_string();
    }

    fn insert_local<S: LocalStore + ?Sized>(&self, store: &S) -> Result<i64> {
        store.insert_transaction(self)
    }

    fn update_local<S: LocalStore + ?Sized>(&self, store: &S) -> Result<usize> {
        store.update_transaction(self)
    }

    fn delete_local<S: LocalStore + ?Sized>(store: &S, id: i64) -> Result<usize> {
        store.delete_transaction(id)
    }

    fn get_local<S: LocalStore + ?Sized>(store: &S, id: i64) -> Result<Option<Self>> {
        store.get_transaction(id)
    }
}

impl Entity for Budget {
    const COLLECTION: Collection = Collection::Budgets;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn set_owner(&mut self, owner: &str) {
        self.owner_id = owner.to_string();
    }

    fn insert_local<S: LocalStore + ?Sized>(&self, store: &S) -> Result<i64> {
        store.insert_budget(self)
    }

    fn update_local<S: LocalStore + ?Sized>(&self, store: &S) -> Result<usize> {
        store.update_budget(self)
    }

    fn delete_local<S: LocalStore + ?Sized>(store: &S, id: i64) -> Result<usize> {
        store.delete_budget(id)
    }

    fn get_local<S: LocalStore + ?Sized>(store: &S, id: i64) -> Result<Option<Self>> {
        store.get_budget(id)
    }
}

impl Entity for Category {
    const COLLECTION: Collection = Collection::Categories;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn set_owner(&mut self, owner: &str) {
        self.owner_id = Some(owner.to_string());
    }

    fn insert_local<S: LocalStore + ?Sized>(&self, store: &S) -> Result<i64> {
        store.insert_category(self)
    }

    fn update_local<S: LocalStore + ?Sized>(&self, store: &S) -> Result<usize> {
        store.update_category(self)
    }

    fn delete_local<S: LocalStore + ?Sized>(store: &S, id: i64) -> Result<usize> {
        store.delete_category(id)
    }

    fn get_local<S: LocalStore + ?Sized>(store: &S, id: i64) -> Result<Option<Self>> {
        store.get_category(id)
    }
}
