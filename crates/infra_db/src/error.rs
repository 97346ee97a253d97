//! Database error types
//!
//! This module defines the error types that can occur during database operations,
//! and their translation into the domain's [`NotesError`] at the adapter boundary.

use domain_notes::NotesError;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The connection string or pool settings are malformed
    #[error("Invalid database configuration: {0}")]
    Configuration(String),

    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Check or not-null constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Value does not fit its column (e.g. an over-long title)
    #[error("Value rejected by column: {0}")]
    InvalidValue(String),

    /// Pool exhaustion - no connection became available in time
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// The pool was closed before or during the call
    #[error("Connection pool is closed")]
    PoolClosed,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_) | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_)
                | DatabaseError::PoolExhausted
                | DatabaseError::PoolClosed
        )
    }

    /// Translates a failure raised while serving `operation`
    ///
    /// At call time every kind, including a lost connection, becomes
    /// `NotesError::Store` tagged with the operation; the pool heals broken
    /// connections on its own and nothing here is retried.
    pub fn into_notes_error(self, operation: &'static str) -> NotesError {
        match self {
            DatabaseError::SqlError(source) => {
                let classified = DatabaseError::from(&source);
                NotesError::Store {
                    operation,
                    message: classified.to_string(),
                    source: Some(Box::new(source)),
                }
            }
            other => NotesError::store(operation, other.to_string()),
        }
    }
}

/// Startup translation: pool construction failures keep their kind
impl From<DatabaseError> for NotesError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Configuration(message) => NotesError::Config { message },
            DatabaseError::ConnectionFailed(message) => NotesError::Connect {
                message,
                source: None,
            },
            DatabaseError::SqlError(source) => NotesError::Connect {
                message: DatabaseError::from(&source).to_string(),
                source: Some(Box::new(source)),
            },
            other => NotesError::Connect {
                message: other.to_string(),
                source: None,
            },
        }
    }
}

/// Converts SQLx errors to more specific DatabaseError variants
///
/// This function analyzes the SQLx error and maps it to the appropriate
/// DatabaseError variant based on the PostgreSQL error code.
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::Configuration(e) => DatabaseError::Configuration(e.to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed => DatabaseError::PoolClosed,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Tls(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => {
                // PostgreSQL error codes
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                        "23502" | "23514" => {
                            DatabaseError::ConstraintViolation(db_err.message().to_string())
                        }
                        "22001" => DatabaseError::InvalidValue(db_err.message().to_string()),
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}
