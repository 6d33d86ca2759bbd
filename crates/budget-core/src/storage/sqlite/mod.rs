//! SQLite local store.
//!
//! One connection guarded by a mutex. Amounts are stored as decimal text so
//! they round-trip exactly; dates are stored as epoch milliseconds so range
//! comparisons are numeric.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, ToSql};
use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::error::{BudgetError, Result};
use crate::storage::live::{ChangeNotifier, Table};
use crate::storage::traits::LocalStore;
use crate::storage::types::{
    Budget, Category, SumQuery, Transaction, TransactionFilter, UNASSIGNED_ID,
};

use row::{
    category_from_row, parse_amount, BudgetRow, TransactionRow, BUDGET_COLUMNS, CATEGORY_COLUMNS,
    TRANSACTION_COLUMNS,
};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        description TEXT NOT NULL,
        date INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        is_income INTEGER NOT NULL DEFAULT 0,
        owner_id TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS transactions_owner_date
    ON transactions (owner_id, date DESC);

    CREATE TABLE IF NOT EXISTS budgets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        month INTEGER NOT NULL,
        year INTEGER NOT NULL,
        owner_id TEXT NOT NULL
    );

    -- Deliberately not UNIQUE: one budget per (owner, category, month, year)
    -- is a convention, not a constraint.
    CREATE INDEX IF NOT EXISTS budgets_owner_period
    ON budgets (owner_id, year, month);

    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        color INTEGER NOT NULL,
        icon TEXT,
        owner_id TEXT
    );
"#;

/// SQLite-backed local store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    changes: ChangeNotifier,
}

impl SqliteStore {
    /// Open (or create) a store file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            BudgetError::Storage(format!("Failed to open store {}: {}", path.display(), e))
        })?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            changes: ChangeNotifier::new(),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| BudgetError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Run a write and notify `table` if it changed anything.
    fn write<T>(
        &self,
        table: Table,
        changed: impl Fn(&T) -> bool,
        op: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        let result = {
            let conn = self.lock_conn()?;
            op(&*conn)?
        };
        if changed(&result) {
            self.changes.notify(table);
        }
        Ok(result)
    }

    fn sum_amount_column(
        conn: &Connection,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Decimal> {
        let mut stmt = conn.prepare(sql)?;
        let amounts = stmt.query_map(params, |row| row.get::<_, String>(0))?;
        let mut total = Decimal::ZERO;
        for amount in amounts {
            total = total.saturating_add(parse_amount(&amount?)?);
        }
        Ok(total)
    }

    fn query_budgets(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Budget>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, BudgetRow::from_row)?;
        let mut budgets = Vec::new();
        for row in rows {
            budgets.push(row?.try_into()?);
        }
        Ok(budgets)
    }
}

impl LocalStore for SqliteStore {
    fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.changes.subscribe(table)
    }

    fn insert_transaction(&self, transaction: &Transaction) -> Result<i64> {
        self.write(Table::Transactions, |_| true, |conn| {
            let amount = transaction.amount.to_string();
            let date = transaction.date.timestamp_millis();
            if transaction.id == UNASSIGNED_ID {
                conn.execute(
                    r#"
                    INSERT INTO transactions
                        (amount, description, date, category_id, is_income, owner_id)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                    (
                        amount,
                        &transaction.description,
                        date,
                        transaction.category_id,
                        transaction.is_income,
                        &transaction.owner_id,
                    ),
                )?;
                Ok(conn.last_insert_rowid())
            } else {
                conn.execute(
                    r#"
                    INSERT OR REPLACE INTO transactions
                        (id, amount, description, date, category_id, is_income, owner_id)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                    (
                        transaction.id,
                        amount,
                        &transaction.description,
                        date,
                        transaction.category_id,
                        transaction.is_income,
                        &transaction.owner_id,
                    ),
                )?;
                Ok(transaction.id)
            }
        })
    }

    fn update_transaction(&self, transaction: &Transaction) -> Result<usize> {
        self.write(Table::Transactions, |rows| *rows > 0, |conn| {
            Ok(conn.execute(
                r#"
                UPDATE transactions
                SET amount = ?, description = ?, date = ?, category_id = ?,
                    is_income = ?, owner_id = ?
                WHERE id = ?
                "#,
                (
                    transaction.amount.to_string(),
                    &transaction.description,
                    transaction.date.timestamp_millis(),
                    transaction.category_id,
                    transaction.is_income,
                    &transaction.owner_id,
                    transaction.id,
                ),
            )?)
        })
    }

    fn delete_transaction(&self, id: i64) -> Result<usize> {
        self.write(Table::Transactions, |rows| *rows > 0, |conn| {
            Ok(conn.execute("DELETE FROM transactions WHERE id = ?", [id])?)
        })
    }

    fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                [id],
                TransactionRow::from_row,
            )
            .optional()?;
        row.map(Transaction::try_from).transpose()
    }

    fn list_transactions(
        &self,
        owner_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        let conn = self.lock_conn()?;

        let mut conditions: Vec<&str> = vec!["owner_id = ?"];
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(owner_id.to_string())];

        if let Some(range) = filter.range {
            conditions.push("date BETWEEN ? AND ?");
            params.push(Box::new(range.start.timestamp_millis()));
            params.push(Box::new(range.end.timestamp_millis()));
        }

        if let Some(category_id) = filter.category_id {
            conditions.push("category_id = ?");
            params.push(Box::new(category_id));
        }

        if let Some(is_income) = filter.is_income {
            conditions.push("is_income = ?");
            params.push(Box::new(is_income));
        }

        let mut query = format!(
            "SELECT {} FROM transactions WHERE {} ORDER BY date DESC, id DESC",
            TRANSACTION_COLUMNS,
            conditions.join(" AND ")
        );

        if let Some(limit) = filter.limit {
            query.push_str(" LIMIT ?");
            let limit = i64::try_from(limit)
                .map_err(|_| BudgetError::InvalidInput("Limit too large".to_string()))?;
            params.push(Box::new(limit));
        }

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            TransactionRow::from_row,
        )?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row?.try_into()?);
        }
        Ok(transactions)
    }

    fn sum_amount(&self, owner_id: &str, query: &SumQuery) -> Result<Decimal> {
        let conn = self.lock_conn()?;

        let mut sql =
            String::from("SELECT amount FROM transactions WHERE owner_id = ? AND is_income = ?");
        let mut params: Vec<Box<dyn ToSql>> =
            vec![Box::new(owner_id.to_string()), Box::new(query.is_income)];

        if let Some(category_id) = query.category_id {
            sql.push_str(" AND category_id = ?");
            params.push(Box::new(category_id));
        }
        if let Some(range) = query.range {
            sql.push_str(" AND date BETWEEN ? AND ?");
            params.push(Box::new(range.start.timestamp_millis()));
            params.push(Box::new(range.end.timestamp_millis()));
        }

        let refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        Self::sum_amount_column(&conn, &sql, &refs)
    }

    fn insert_budget(&self, budget: &Budget) -> Result<i64> {
        self.write(Table::Budgets, |_| true, |conn| {
            let amount = budget.amount.to_string();
            if budget.id == UNASSIGNED_ID {
                conn.execute(
                    "INSERT INTO budgets (amount, category_id, month, year, owner_id) VALUES (?, ?, ?, ?, ?)",
                    (amount, budget.category_id, budget.month, budget.year, &budget.owner_id),
                )?;
                Ok(conn.last_insert_rowid())
            } else {
                conn.execute(
                    "INSERT OR REPLACE INTO budgets (id, amount, category_id, month, year, owner_id) VALUES (?, ?, ?, ?, ?, ?)",
                    (
                        budget.id,
                        amount,
                        budget.category_id,
                        budget.month,
                        budget.year,
                        &budget.owner_id,
                    ),
                )?;
                Ok(budget.id)
            }
        })
    }

    fn update_budget(&self, budget: &Budget) -> Result<usize> {
        self.write(Table::Budgets, |rows| *rows > 0, |conn| {
            Ok(conn.execute(
                "UPDATE budgets SET amount = ?, category_id = ?, month = ?, year = ?, owner_id = ? WHERE id = ?",
                (
                    budget.amount.to_string(),
                    budget.category_id,
                    budget.month,
                    budget.year,
                    &budget.owner_id,
                    budget.id,
                ),
            )?)
        })
    }

    fn delete_budget(&self, id: i64) -> Result<usize> {
        self.write(Table::Budgets, |rows| *rows > 0, |conn| {
            Ok(conn.execute("DELETE FROM budgets WHERE id = ?", [id])?)
        })
    }

    fn get_budget(&self, id: i64) -> Result<Option<Budget>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM budgets WHERE id = ?", BUDGET_COLUMNS),
                [id],
                BudgetRow::from_row,
            )
            .optional()?;
        row.map(Budget::try_from).transpose()
    }

    fn list_budgets(&self, owner_id: &str) -> Result<Vec<Budget>> {
        let conn = self.lock_conn()?;
        Self::query_budgets(
            &conn,
            &format!(
                "SELECT {} FROM budgets WHERE owner_id = ? ORDER BY year DESC, month DESC, id ASC",
                BUDGET_COLUMNS
            ),
            &[&owner_id],
        )
    }

    fn budgets_for_month(&self, owner_id: &str, month: u32, year: i32) -> Result<Vec<Budget>> {
        let conn = self.lock_conn()?;
        Self::query_budgets(
            &conn,
            &format!(
                "SELECT {} FROM budgets WHERE owner_id = ? AND month = ? AND year = ? ORDER BY id ASC",
                BUDGET_COLUMNS
            ),
            &[&owner_id, &month, &year],
        )
    }

    fn budget_for_category(
        &self,
        owner_id: &str,
        category_id: i64,
        month: u32,
        year: i32,
    ) -> Result<Option<Budget>> {
        let conn = self.lock_conn()?;
        let budgets = Self::query_budgets(
            &conn,
            &format!(
                "SELECT {} FROM budgets WHERE owner_id = ? AND category_id = ? AND month = ? AND year = ? ORDER BY id ASC LIMIT 1",
                BUDGET_COLUMNS
            ),
            &[&owner_id, &category_id, &month, &year],
        )?;
        Ok(budgets.into_iter().next())
    }

    fn total_budget_for_month(&self, owner_id: &str, month: u32, year: i32) -> Result<Decimal> {
        let conn = self.lock_conn()?;
        Self::sum_amount_column(
            &conn,
            "SELECT amount FROM budgets WHERE owner_id = ? AND month = ? AND year = ?",
            &[&owner_id, &month, &year],
        )
    }

    fn insert_category(&self, category: &Category) -> Result<i64> {
        self.write(Table::Categories, |_| true, |conn| {
            insert_category_row(conn, category)
        })
    }

    fn update_category(&self, category: &Category) -> Result<usize> {
        self.write(Table::Categories, |rows| *rows > 0, |conn| {
            Ok(conn.execute(
                "UPDATE categories SET name = ?, color = ?, icon = ?, owner_id = ? WHERE id = ?",
                (
                    &category.name,
                    category.color,
                    &category.icon,
                    &category.owner_id,
                    category.id,
                ),
            )?)
        })
    }

    fn delete_category(&self, id: i64) -> Result<usize> {
        self.write(Table::Categories, |rows| *rows > 0, |conn| {
            Ok(conn.execute("DELETE FROM categories WHERE id = ?", [id])?)
        })
    }

    fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.lock_conn()?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
                [id],
                category_from_row,
            )
            .optional()?)
    }

    fn list_categories(&self, owner_id: &str) -> Result<Vec<Category>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE owner_id IS NULL OR owner_id = ? ORDER BY name ASC, id ASC",
            CATEGORY_COLUMNS
        ))?;
        let rows = stmt.query_map([owner_id], category_from_row)?;
        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn count_categories(&self) -> Result<usize> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| BudgetError::Storage(format!("Invalid category count: {}", count)))
    }

    fn insert_categories(&self, categories: &[Category]) -> Result<()> {
        self.write(Table::Categories, |_| !categories.is_empty(), |conn| {
            let tx = conn.unchecked_transaction()?;
            for category in categories {
                insert_category_row(&tx, category)?;
            }
            tx.commit()?;
            Ok(())
        })
    }
}

fn insert_category_row(conn: &Connection, category: &Category) -> Result<i64> {
    if category.id == UNASSIGNED_ID {
        conn.execute(
            "INSERT INTO categories (name, color, icon, owner_id) VALUES (?, ?, ?, ?)",
            (&category.name, category.color, &category.icon, &category.owner_id),
        )?;
        Ok(conn.last_insert_rowid())
    } else {
        conn.execute(
            "INSERT OR REPLACE INTO categories (id, name, color, icon, owner_id) VALUES (?, ?, ?, ?, ?)",
            (
                category.id,
                &category.name,
                category.color,
                &category.icon,
                &category.owner_id,
            ),
        )?;
        Ok(category.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::DateRange;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn day(d: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_generates_id_and_round_trips() {
        let store = store();
        let tx = Transaction::new(dec!(19.99), "Groceries", day(2), 1, "u1");

        let id = store.insert_transaction(&tx).unwrap();
        assert_ne!(id, UNASSIGNED_ID);

        let loaded = store.get_transaction(id).unwrap().unwrap();
        assert_eq!(loaded, tx.with_id(id));
    }

    #[test]
    fn test_insert_with_id_replaces_row() {
        let store = store();
        let first = Transaction::new(dec!(10), "Old", day(1), 1, "u1").with_id(42);
        let second = Transaction::new(dec!(20), "New", day(1), 2, "u1").with_id(42);

        store.insert_transaction(&first).unwrap();
        store.insert_transaction(&second).unwrap();

        let all = store
            .list_transactions("u1", &TransactionFilter::new())
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description, "New");
    }

    #[test]
    fn test_list_orders_newest_first_and_filters() {
        let store = store();
        store
            .insert_transaction(&Transaction::new(dec!(5), "a", day(1), 1, "u1"))
            .unwrap();
        store
            .insert_transaction(&Transaction::new(dec!(6), "b", day(9), 2, "u1"))
            .unwrap();
        store
            .insert_transaction(&Transaction::new(dec!(7), "c", day(5), 1, "u1").income())
            .unwrap();
        store
            .insert_transaction(&Transaction::new(dec!(8), "other", day(5), 1, "u2"))
            .unwrap();

        let all = store
            .list_transactions("u1", &TransactionFilter::new())
            .unwrap();
        let names: Vec<_> = all.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);

        let expenses = store
            .list_transactions("u1", &TransactionFilter::new().income(false))
            .unwrap();
        assert_eq!(expenses.len(), 2);

        let category = store
            .list_transactions("u1", &TransactionFilter::new().category(1))
            .unwrap();
        assert_eq!(category.len(), 2);

        let window = store
            .list_transactions(
                "u1",
                &TransactionFilter::new().range(DateRange::new(day(4), day(6))),
            )
            .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].description, "c");
    }

    #[test]
    fn test_sum_returns_zero_when_empty() {
        let store = store();
        assert_eq!(
            store.sum_amount("u1", &SumQuery::expenses()).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_sum_respects_type_category_and_range() {
        let store = store();
        store
            .insert_transaction(&Transaction::new(dec!(0.10), "a", day(1), 5, "u1"))
            .unwrap();
        store
            .insert_transaction(&Transaction::new(dec!(0.20), "b", day(2), 5, "u1"))
            .unwrap();
        store
            .insert_transaction(&Transaction::new(dec!(100), "pay", day(2), 8, "u1").income())
            .unwrap();
        store
            .insert_transaction(&Transaction::new(dec!(3), "c", day(20), 5, "u1"))
            .unwrap();

        assert_eq!(
            store.sum_amount("u1", &SumQuery::expenses()).unwrap(),
            dec!(3.30)
        );
        assert_eq!(
            store.sum_amount("u1", &SumQuery::income()).unwrap(),
            dec!(100)
        );
        let period = SumQuery::expenses()
            .category(5)
            .range(DateRange::new(day(1), day(10)));
        assert_eq!(store.sum_amount("u1", &period).unwrap(), dec!(0.30));
    }

    #[test]
    fn test_update_and_delete_report_rows() {
        let store = store();
        let id = store
            .insert_budget(&Budget::new(dec!(100), 5, 3, 2024, "u1"))
            .unwrap();

        let changed = store
            .update_budget(&Budget::new(dec!(150), 5, 3, 2024, "u1").with_id(id))
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(store.get_budget(id).unwrap().unwrap().amount, dec!(150));

        assert_eq!(store.update_budget(&Budget::new(dec!(1), 1, 1, 2024, "u1").with_id(999)).unwrap(), 0);
        assert_eq!(store.delete_budget(id).unwrap(), 1);
        assert!(store.get_budget(id).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_budgets_lowest_id_wins() {
        let store = store();
        let first = store
            .insert_budget(&Budget::new(dec!(100), 5, 3, 2024, "u1"))
            .unwrap();
        store
            .insert_budget(&Budget::new(dec!(200), 5, 3, 2024, "u1"))
            .unwrap();

        let found = store.budget_for_category("u1", 5, 3, 2024).unwrap().unwrap();
        assert_eq!(found.id, first);
        assert_eq!(store.budgets_for_month("u1", 3, 2024).unwrap().len(), 2);
        assert_eq!(
            store.total_budget_for_month("u1", 3, 2024).unwrap(),
            dec!(300)
        );
    }

    #[test]
    fn test_categories_include_global_rows() {
        let store = store();
        store
            .insert_categories(&[
                Category::new("Food", 0x558B2F).with_id(1),
                Category::new("Mine", 0x000001).with_owner("u1"),
                Category::new("Theirs", 0x000002).with_owner("u2"),
            ])
            .unwrap();

        let visible = store.list_categories("u1").unwrap();
        let names: Vec<_> = visible.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Mine"]);
        assert_eq!(store.count_categories().unwrap(), 3);
    }

    #[test]
    fn test_writes_bump_change_version() {
        let store = store();
        let rx = store.subscribe(Table::Transactions);

        store
            .insert_transaction(&Transaction::new(dec!(1), "x", day(1), 1, "u1"))
            .unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(store.delete_transaction(12345).unwrap(), 0);
        assert_eq!(*rx.borrow(), 1);
    }

    #[test]
    fn test_open_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("budget.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert_category(&Category::new("Food", 1).with_id(1))
                .unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count_categories().unwrap(), 1);
    }
}
