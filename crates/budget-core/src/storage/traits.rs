//! Local store trait definition.
//!
//! The `LocalStore` trait is the on-device relational cache the repository
//! writes through. It is the source of truth for every read; the remote
//! store only ever feeds it during pull sync.

use rust_decimal::Decimal;
use tokio::sync::watch;

use super::live::Table;
use super::types::{Budget, Category, SumQuery, Transaction, TransactionFilter};
use crate::error::Result;

/// On-device storage for transactions, budgets and categories.
///
/// All implementations must ensure:
/// - A zero identifier on insert means "generate one"
/// - Inserting with an explicit identifier replaces any existing row
/// - Every committed write bumps the change version of its table
/// - Owner filters compare literally; the empty owner is a valid partition
pub trait LocalStore: Send + Sync {
    /// Receiver for change notifications on `table`.
    fn subscribe(&self, table: Table) -> watch::Receiver<u64>;

    // --- Transaction operations ---

    /// Insert a transaction, returning its identifier.
    fn insert_transaction(&self, transaction: &Transaction) -> Result<i64>;

    /// Replace every field of the transaction with a matching identifier.
    ///
    /// # Returns
    ///
    /// Number of rows changed (0 when the identifier is unknown).
    fn update_transaction(&self, transaction: &Transaction) -> Result<usize>;

    /// Delete a transaction by identifier.
    fn delete_transaction(&self, id: i64) -> Result<usize>;

    /// Get a transaction by identifier.
    fn get_transaction(&self, id: i64) -> Result<Option<Transaction>>;

    /// List an owner's transactions, newest first.
    fn list_transactions(&self, owner_id: &str, filter: &TransactionFilter)
        -> Result<Vec<Transaction>>;

    /// Sum matching transaction amounts. Returns zero when nothing matches.
    fn sum_amount(&self, owner_id: &str, query: &SumQuery) -> Result<Decimal>;

    // --- Budget operations ---

    fn insert_budget(&self, budget: &Budget) -> Result<i64>;

    fn update_budget(&self, budget: &Budget) -> Result<usize>;

    fn delete_budget(&self, id: i64) -> Result<usize>;

    fn get_budget(&self, id: i64) -> Result<Option<Budget>>;

    /// All of an owner's budgets, latest period first.
    fn list_budgets(&self, owner_id: &str) -> Result<Vec<Budget>>;

    /// Budgets for one (month, year).
    fn budgets_for_month(&self, owner_id: &str, month: u32, year: i32) -> Result<Vec<Budget>>;

    /// The budget for a category in one (month, year).
    ///
    /// Uniqueness is not enforced; when duplicates exist the row with the
    /// lowest identifier is returned.
    fn budget_for_category(
        &self,
        owner_id: &str,
        category_id: i64,
        month: u32,
        year: i32,
    ) -> Result<Option<Budget>>;

    /// Sum of budget limits for one (month, year). Zero when none exist.
    fn total_budget_for_month(&self, owner_id: &str, month: u32, year: i32) -> Result<Decimal>;

    // --- Category operations ---

    fn insert_category(&self, category: &Category) -> Result<i64>;

    fn update_category(&self, category: &Category) -> Result<usize>;

    fn delete_category(&self, id: i64) -> Result<usize>;

    fn get_category(&self, id: i64) -> Result<Option<Category>>;

    /// Categories visible to the owner (global ones included), by name.
    fn list_categories(&self, owner_id: &str) -> Result<Vec<Category>>;

    /// Number of category rows regardless of owner.
    fn count_categories(&self) -> Result<usize>;

    /// Insert several categories in one transaction.
    fn insert_categories(&self, categories: &[Category]) -> Result<()>;
}
