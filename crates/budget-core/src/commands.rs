//! User-facing write commands.
//!
//! Each command validates its input first. Invalid input is skipped without
//! an error: the command returns `Ok(None)` and nothing is written. Local
//! store failures still propagate.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::repository::{Mirrored, Repository};
use crate::storage::{Budget, LocalStore, Transaction};
use crate::validation::{validate_budget, validate_transaction};

/// Fields a user supplies for a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub description: String,
    pub date: DateTime<Utc>,
    pub category_id: i64,
    pub is_income: bool,
}

impl TransactionDraft {
    fn into_transaction(self, owner: &str) -> Transaction {
        let tx = Transaction::new(
            self.amount,
            self.description,
            self.date,
            self.category_id,
            owner,
        );
        if self.is_income {
            tx.income()
        } else {
            tx
        }
    }
}

pub fn add_transaction<S: LocalStore + 'static>(
    repo: &Repository<S>,
    owner: &str,
    draft: TransactionDraft,
    now: DateTime<Utc>,
) -> Result<Option<Mirrored<Transaction>>> {
    let tx = draft.into_transaction(owner);
    if let Err(issue) = validate_transaction(&tx, now) {
        tracing::debug!("Skipping invalid transaction: {}", issue);
        return Ok(None);
    }
    repo.insert(owner, tx).map(Some)
}

/// Full replace of an existing transaction.
pub fn edit_transaction<S: LocalStore + 'static>(
    repo: &Repository<S>,
    owner: &str,
    tx: Transaction,
    now: DateTime<Utc>,
) -> Result<Option<Mirrored<Transaction>>> {
    if let Err(issue) = validate_transaction(&tx, now) {
        tracing::debug!("Skipping invalid edit of transaction {}: {}", tx.id, issue);
        return Ok(None);
    }
    repo.update(owner, tx).map(Some)
}

/// Budget for `category_id` in the month containing `now`.
pub fn add_budget<S: LocalStore + 'static>(
    repo: &Repository<S>,
    owner: &str,
    amount: Decimal,
    category_id: i64,
    now: DateTime<Utc>,
) -> Result<Option<Mirrored<Budget>>> {
    let budget = Budget::new(amount, category_id, now.month(), now.year(), owner);
    if let Err(issue) = validate_budget(&budget) {
        tracing::debug!("Skipping invalid budget: {}", issue);
        return Ok(None);
    }
    repo.insert(owner, budget).map(Some)
}

pub fn edit_budget<S: LocalStore + 'static>(
    repo: &Repository<S>,
    owner: &str,
    budget: Budget,
) -> Result<Option<Mirrored<Budget>>> {
    if let Err(issue) = validate_budget(&budget) {
        tracing::debug!("Skipping invalid edit of budget {}: {}", budget.id, issue);
        return Ok(None);
    }
    repo.update(owner, budget).map(Some)
}
