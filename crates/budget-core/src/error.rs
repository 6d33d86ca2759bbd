//! Error types for budget core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-facing messages.

use thiserror::Error;

use crate::remote::RemoteError;

/// Result type alias for budget operations.
pub type Result<T> = std::result::Result<T, BudgetError>;

/// Core error type for budget operations.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Local storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote document store error
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// CSV export error
    #[error("Export error: {0}")]
    Export(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for BudgetError {
    fn from(err: rusqlite::Error) -> Self {
        BudgetError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::Validation(err.to_string())
    }
}

impl From<csv::Error> for BudgetError {
    fn from(err: csv::Error) -> Self {
        BudgetError::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_converts() {
        let err: BudgetError = RemoteError::Unavailable("offline".to_string()).into();
        assert!(matches!(err, BudgetError::Remote(_)));
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn test_sqlite_error_maps_to_storage() {
        let err: BudgetError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, BudgetError::Storage(_)));
    }
}
