//! Row types for database queries.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{BudgetError, Result};
use crate::storage::types::{Budget, Category, Transaction};

pub(super) const TRANSACTION_COLUMNS: &str =
    "id, amount, description, date, category_id, is_income, owner_id";
pub(super) const BUDGET_COLUMNS: &str = "id, amount, category_id, month, year, owner_id";
pub(super) const CATEGORY_COLUMNS: &str = "id, name, color, icon, owner_id";

pub(super) fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| BudgetError::Storage(format!("Invalid stored amount '{}': {}", raw, e)))
}

/// Raw row data from the transactions table.
#[derive(Debug)]
pub struct TransactionRow {
    pub id: i64,
    pub amount: String,
    pub description: String,
    pub date_millis: i64,
    pub category_id: i64,
    pub is_income: bool,
    pub owner_id: String,
}

impl TransactionRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            description: row.get(2)?,
            date_millis: row.get(3)?,
            category_id: row.get(4)?,
            is_income: row.get(5)?,
            owner_id: row.get(6)?,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = BudgetError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let date = DateTime::<Utc>::from_timestamp_millis(row.date_millis).ok_or_else(|| {
            BudgetError::Storage(format!("Invalid stored date: {}", row.date_millis))
        })?;
        Ok(Transaction {
            id: row.id,
            amount: parse_amount(&row.amount)?,
            description: row.description,
            date,
            category_id: row.category_id,
            is_income: row.is_income,
            owner_id: row.owner_id,
        })
    }
}

/// Raw row data from the budgets table.
#[derive(Debug)]
pub struct BudgetRow {
    pub id: i64,
    pub amount: String,
    pub category_id: i64,
    pub month: u32,
    pub year: i32,
    pub owner_id: String,
}

impl BudgetRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            category_id: row.get(2)?,
            month: row.get(3)?,
            year: row.get(4)?,
            owner_id: row.get(5)?,
        })
    }
}

impl TryFrom<BudgetRow> for Budget {
    type Error = BudgetError;

    fn try_from(row: BudgetRow) -> Result<Self> {
        Ok(Budget {
            id: row.id,
            amount: parse_amount(&row.amount)?,
            category_id: row.category_id,
            month: row.month,
            year: row.year,
            owner_id: row.owner_id,
        })
    }
}

/// Category rows need no parsing beyond column reads.
pub fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
        owner_id: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_row_converts() {
        let row = TransactionRow {
            id: 4,
            amount: "12.50".to_string(),
            description: "Lunch".to_string(),
            date_millis: 1_700_000_000_000,
            category_id: 1,
            is_income: false,
            owner_id: "u1".to_string(),
        };

        let tx: Transaction = row.try_into().unwrap();
        assert_eq!(tx.amount, dec!(12.5));
        assert_eq!(tx.date.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_bad_amount_is_storage_error() {
        let row = BudgetRow {
            id: 1,
            amount: "lots".to_string(),
            category_id: 1,
            month: 1,
            year: 2024,
            owner_id: String::new(),
        };

        let result: Result<Budget> = row.try_into();
        assert!(matches!(result, Err(BudgetError::Storage(_))));
    }
}
