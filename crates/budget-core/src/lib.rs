//! # Budget Core
//!
//! Core library for Budget Tracker - a local-first personal finance tracker
//! with a best-effort remote mirror.
//!
//! This crate provides the domain types, storage, sync and reporting logic
//! independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **storage**: Local store trait, SQLite implementation, live queries
//! - **remote**: Remote document store trait plus memory and HTTP backends
//! - **identity**: Owner identity and auth-state notifications
//! - **repository**: Local-first CRUD, remote mirroring, pull sync, seeding
//! - **report**: Spending, budget progress and trend aggregation
//! - **export**: CSV export
//! - **validation** / **commands**: Entry-time checks and write commands

pub mod commands;
pub mod error;
pub mod export;
pub mod fs;
pub mod identity;
pub mod remote;
pub mod report;
pub mod repository;
pub mod storage;
pub mod validation;

pub use error::{BudgetError, Result};
pub use identity::{IdentityProvider, SessionIdentity, StaticIdentity};
pub use remote::{RemoteError, RemoteStore};
pub use repository::{Entity, MirrorHandle, MirrorOutcome, Mirrored, Repository, SyncReport};
pub use storage::{LiveQuery, LocalStore, SqliteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
