//! Store error types
//!
//! Error codes:
//! - AERO_STORE_NOT_EMPTY (FATAL)
//! - AERO_STORE_DUPLICATE_KEY (FATAL)
//! - AERO_STORE_UNKNOWN_INDEX (REJECT)
//! - AERO_STORE_CONFIG_INVALID (REJECT)
//!
//! Index and query errors pass through unchanged with their own codes.

use thiserror::Error;

use crate::index::{IndexError, IndexKey};
use crate::query::QueryError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// `populate` on a store that already holds entries
    #[error("[FATAL] AERO_STORE_NOT_EMPTY: Store already holds {0} entries")]
    NotEmpty(usize),

    /// Two items passed to `populate` share a primary key
    #[error("[FATAL] AERO_STORE_DUPLICATE_KEY: Primary key '{0}' appears more than once")]
    DuplicateKey(IndexKey),

    /// Direct index access by an unregistered name
    #[error("[REJECT] AERO_STORE_UNKNOWN_INDEX: Index '{0}' does not exist")]
    UnknownIndex(String),

    /// Invalid or unreadable store configuration
    #[error("[REJECT] AERO_STORE_CONFIG_INVALID: {0}")]
    Config(String),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl StoreError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotEmpty(_) => "AERO_STORE_NOT_EMPTY",
            StoreError::DuplicateKey(_) => "AERO_STORE_DUPLICATE_KEY",
            StoreError::UnknownIndex(_) => "AERO_STORE_UNKNOWN_INDEX",
            StoreError::Config(_) => "AERO_STORE_CONFIG_INVALID",
            StoreError::Index(e) => e.code().code(),
            StoreError::Query(e) => e.code().code(),
        }
    }

    /// Contract violations; the caller must fix state before retrying
    pub fn is_fatal(&self) -> bool {
        match self {
            StoreError::NotEmpty(_) | StoreError::DuplicateKey(_) => true,
            StoreError::Index(e) => e.is_fatal(),
            _ => false,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        StoreError::Config(message.into())
    }
}
