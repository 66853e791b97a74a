//! Todo store error types.

use thiserror::Error;

/// Errors that can occur during todo store operations.
#[derive(Debug, Error)]
pub enum TodoStoreError {
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Stored data could not be decoded, e.g. an unknown completion token.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The store could not be reached.
    #[error("Connection failure: {0}")]
    Connection(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Session file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl TodoStoreError {
    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a not found error for a todo within a list.
    pub fn todo_not_found(list_id: i64, todo_id: i64) -> Self {
        Self::not_found("Todo", format!("{todo_id} in list {list_id}"))
    }

    /// Creates an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    /// Returns true if the store could not be reached.
    ///
    /// Retrying is left to the caller.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<sqlx::Error> for TodoStoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(err.to_string()),
            other => Self::Database(other),
        }
    }
}

/// Result type for todo store operations.
pub type TodoStoreResult<T> = Result<T, TodoStoreError>;
