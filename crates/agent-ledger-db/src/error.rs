//! Database error types

use agent_ledger_types::LedgerError;
use thiserror::Error;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored row could not be mapped back into a domain value
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<LedgerError> for DbError {
    fn from(e: LedgerError) -> Self {
        DbError::InvalidInput(e.to_string())
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
