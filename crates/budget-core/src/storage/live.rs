//! Continuously-updated queries.
//!
//! The store bumps a per-table version on every committed write. A
//! [`LiveQuery`] holds a receiver for the table it reads and re-runs its
//! query whenever that version moves. There is no polling.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{BudgetError, Result};

/// Tables that publish change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Transactions,
    Budgets,
    Categories,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Transactions => "transactions",
            Table::Budgets => "budgets",
            Table::Categories => "categories",
        }
    }
}

/// Per-table change versions.
pub struct ChangeNotifier {
    transactions: watch::Sender<u64>,
    budgets: watch::Sender<u64>,
    categories: watch::Sender<u64>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            transactions: watch::channel(0).0,
            budgets: watch::channel(0).0,
            categories: watch::channel(0).0,
        }
    }

    fn sender(&self, table: Table) -> &watch::Sender<u64> {
        match table {
            Table::Transactions => &self.transactions,
            Table::Budgets => &self.budgets,
            Table::Categories => &self.categories,
        }
    }

    /// Record a committed change to `table`.
    pub fn notify(&self, table: Table) {
        self.sender(table).send_modify(|version| *version += 1);
    }

    /// Current version of `table`.
    pub fn version(&self, table: Table) -> u64 {
        *self.sender(table).borrow()
    }

    /// Receiver that observes future changes to `table`.
    pub fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.sender(table).subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

type QueryFn<T> = Arc<dyn Fn() -> Result<T> + Send + Sync>;

/// A query whose result is recomputed whenever its table changes.
pub struct LiveQuery<T> {
    query: QueryFn<T>,
    changes: watch::Receiver<u64>,
}

impl<T> fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveQuery")
            .field("version", &*self.changes.borrow())
            .finish()
    }
}

impl<T: Send + 'static> LiveQuery<T> {
    pub fn new<F>(changes: watch::Receiver<u64>, query: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self {
            query: Arc::new(query),
            changes,
        }
    }

    /// Run the query against the store as it is right now.
    pub fn current(&self) -> Result<T> {
        (self.query)()
    }

    /// Whether a commit has landed since the last `changed()`.
    pub fn has_changed(&self) -> bool {
        self.changes.has_changed().unwrap_or(false)
    }

    /// Wait for the next committed change, then return the fresh result.
    ///
    /// Several commits that land between calls collapse into one wake-up.
    pub async fn changed(&mut self) -> Result<T> {
        self.changes
            .changed()
            .await
            .map_err(|_| BudgetError::Storage("Local store was closed".to_string()))?;
        self.changes.borrow_and_update();
        self.current()
    }

    /// Derive a new live query by transforming each result.
    pub fn map<U, F>(self, f: F) -> LiveQuery<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let query = self.query;
        LiveQuery {
            query: Arc::new(move || query().map(&f)),
            changes: self.changes,
        }
    }

    /// Deliver the current result and every subsequent one to `callback`
    /// on a background task. The task ends once the store is dropped or a
    /// query fails. Abort the returned handle to stop it sooner.
    pub fn observe<F>(mut self, callback: F) -> JoinHandle<()>
    where
        F: Fn(T) + Send + 'static,
    {
        tokio::spawn(async move {
            match self.current() {
                Ok(value) => callback(value),
                Err(err) => {
                    tracing::warn!("Live query failed: {}", err);
                    return;
                }
            }
            loop {
                match self.changed().await {
                    Ok(value) => callback(value),
                    Err(err) => {
                        tracing::debug!("Live query observer stopped: {}", err);
                        return;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn test_changed_wakes_after_notify() {
        let notifier = ChangeNotifier::new();
        let counter = Arc::new(AtomicU64::new(0));
        let source = Arc::clone(&counter);
        let mut live = LiveQuery::new(notifier.subscribe(Table::Budgets), move || {
            Ok(source.load(Ordering::SeqCst))
        });

        assert_eq!(live.current().unwrap(), 0);
        assert!(!live.has_changed());

        counter.store(3, Ordering::SeqCst);
        notifier.notify(Table::Budgets);

        assert!(live.has_changed());
        assert_eq!(live.changed().await.unwrap(), 3);
        assert!(!live.has_changed());
    }

    #[test]
    fn test_notify_only_touches_one_table() {
        let notifier = ChangeNotifier::new();
        notifier.notify(Table::Transactions);
        notifier.notify(Table::Transactions);

        assert_eq!(notifier.version(Table::Transactions), 2);
        assert_eq!(notifier.version(Table::Categories), 0);
    }

    #[test]
    fn test_map_transforms_result() {
        let notifier = ChangeNotifier::new();
        let live = LiveQuery::new(notifier.subscribe(Table::Categories), || Ok(vec![1, 2, 3]))
            .map(|items| items.len());

        assert_eq!(live.current().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_observe_stops_when_notifier_dropped() {
        let notifier = ChangeNotifier::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let live = LiveQuery::new(notifier.subscribe(Table::Transactions), || Ok(7u64));
        let task = live.observe(move |value| {
            let _ = tx.send(value);
        });

        assert_eq!(rx.recv().await, Some(7));
        notifier.notify(Table::Transactions);
        assert_eq!(rx.recv().await, Some(7));

        drop(notifier);
        tokio::time::timeout(std::time::Duration::from_secs(2), task)
            .await
            .expect("observer should stop")
            .unwrap();
        assert_eq!(rx.recv().await, None);
    }
}
