//! Local storage layer.
//!
//! Provides the [`LocalStore`] trait, its SQLite implementation and the
//! live-query plumbing that pushes fresh results after each commit.

pub mod live;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use live::{ChangeNotifier, LiveQuery, Table};
pub use sqlite::SqliteStore;
pub use traits::LocalStore;
pub use types::{
    Budget, Category, DateRange, SumQuery, Transaction, TransactionFilter, UserProfile,
    UNASSIGNED_ID,
};
