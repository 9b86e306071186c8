//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the application.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    Conflict { constraint: String },

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Wrap a query error, lifting unique violations into [`DatabaseError::Conflict`]
    pub fn query(err: SqlxError) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DatabaseError::Conflict {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        DatabaseError::Query(err)
    }

    /// Whether this is a conflict on the named constraint
    pub fn is_conflict_on(&self, name: &str) -> bool {
        matches!(self, DatabaseError::Conflict { constraint } if constraint == name)
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
