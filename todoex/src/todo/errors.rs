//! Todo error types.

use thiserror::Error;

use super::models::UnknownStatus;
use crate::errors::ErrorClass;

/// Todo errors
#[derive(Debug, Error)]
pub enum TodoError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid input
    #[error("{0}")]
    Validation(String),

    /// Todo absent, archived, or owned by someone else
    #[error("Todo not found")]
    NotFound,

    /// Stored status text is not a known variant
    #[error("Corrupt todo row: {0}")]
    CorruptRow(#[from] UnknownStatus),
}

impl TodoError {
    pub fn class(&self) -> ErrorClass {
        match self {
            TodoError::Validation(_) => ErrorClass::Validation,
            TodoError::NotFound => ErrorClass::NotFound,
            TodoError::Database(_) | TodoError::CorruptRow(_) => ErrorClass::Internal,
        }
    }

    /// Client-safe message; storage detail is hidden.
    pub fn client_message(&self) -> String {
        if self.class().is_client_safe() {
            self.to_string()
        } else {
            "Internal server error".to_string()
        }
    }
}

/// Result type for todo operations
pub type TodoResult<T> = Result<T, TodoError>;
