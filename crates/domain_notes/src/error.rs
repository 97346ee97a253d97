//! Error types for notes operations
//!
//! `NotesError` is the only failure type crossing the repository contract.
//! Store-specific errors are translated into it by the adapters, so callers
//! never need to understand database internals.
//!
//! A missing note is not an error: lookups return `Option<Note>` and deletes
//! return [`DeleteOutcome`](crate::DeleteOutcome).

use std::fmt;
use thiserror::Error;

/// Boxed error source carried by store and connection failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the notes domain
pub type NotesResult<T> = Result<T, NotesError>;

/// Why an in-flight call stopped before completing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller fired its cancellation handle
    Cancelled,
    /// The caller's deadline elapsed
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => write!(f, "cancelled by caller"),
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Errors returned by notes repository operations
#[derive(Debug, Error)]
pub enum NotesError {
    /// Malformed connection settings; fatal at startup
    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    /// The store could not be reached
    #[error("Connection error: {message}")]
    Connect {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A statement failed while executing a logical operation
    #[error("Store error during {operation}: {message}")]
    Store {
        operation: &'static str,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Caller-supplied input (cursor, id, limit, request body) is malformed
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The caller's context ended before the operation completed
    #[error("{operation} {reason}")]
    Cancelled {
        operation: &'static str,
        reason: CancelReason,
    },
}

impl NotesError {
    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        NotesError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Validation error tied to a specific input field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        NotesError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a Store error for the named operation
    pub fn store(operation: &'static str, message: impl Into<String>) -> Self {
        NotesError::Store {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Store error wrapping the underlying cause
    pub fn store_with_source<E>(operation: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        NotesError::Store {
            operation,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a Cancelled error
    pub fn cancelled(operation: &'static str, reason: CancelReason) -> Self {
        NotesError::Cancelled { operation, reason }
    }

    /// Checks if this error came from malformed caller input
    pub fn is_validation(&self) -> bool {
        matches!(self, NotesError::Validation { .. })
    }

    /// Checks if this error is a cancellation or deadline expiry
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NotesError::Cancelled { .. })
    }

    /// Checks if this error is a store execution failure
    pub fn is_store(&self) -> bool {
        matches!(self, NotesError::Store { .. })
    }

    /// Returns the logical operation the error is attributed to, if any
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            NotesError::Store { operation, .. } | NotesError::Cancelled { operation, .. } => {
                Some(operation)
            }
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for NotesError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors.field_errors().keys().next().map(|f| f.to_string());
        NotesError::Validation {
            message: errors.to_string(),
            field,
        }
    }
}
