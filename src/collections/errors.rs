//! Collection error types
//!
//! Error codes:
//! - AERO_COLLECTION_NOT_EMPTY (FATAL)
//! - AERO_COLLECTION_DUPLICATE_KEY (FATAL)
//! - AERO_COLLECTION_INVARIANT (FATAL)

use std::fmt;

/// Severity levels for collection errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Programmer error, state must be fixed before retrying
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Collection-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionErrorCode {
    /// Bulk load into a non-empty structure
    AeroCollectionNotEmpty,
    /// Key already present in a unique tree
    AeroCollectionDuplicateKey,
    /// Structural invariant does not hold
    AeroCollectionInvariant,
}

impl CollectionErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CollectionErrorCode::AeroCollectionNotEmpty => "AERO_COLLECTION_NOT_EMPTY",
            CollectionErrorCode::AeroCollectionDuplicateKey => "AERO_COLLECTION_DUPLICATE_KEY",
            CollectionErrorCode::AeroCollectionInvariant => "AERO_COLLECTION_INVARIANT",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for CollectionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Collection error with context
#[derive(Debug, Clone)]
pub struct CollectionError {
    code: CollectionErrorCode,
    message: String,
}

impl CollectionError {
    /// Bulk load attempted on a non-empty structure
    pub fn not_empty(len: usize) -> Self {
        Self {
            code: CollectionErrorCode::AeroCollectionNotEmpty,
            message: format!("cannot bulk load: structure already holds {} entries", len),
        }
    }

    /// Insert of an existing key into a unique tree
    pub fn duplicate_key() -> Self {
        Self {
            code: CollectionErrorCode::AeroCollectionDuplicateKey,
            message: "key already present in unique tree".into(),
        }
    }

    /// Invariant check failure
    pub fn invariant(reason: impl Into<String>) -> Self {
        Self {
            code: CollectionErrorCode::AeroCollectionInvariant,
            message: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> CollectionErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for CollectionError {}

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;
