//! Error types for hop-db

use thiserror::Error;

/// DuckDB backend errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open or create the database (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Record table name is not a plain or schema-qualified identifier (D002)
    #[error("[D002] Invalid record table name: '{0}'")]
    InvalidTableName(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
