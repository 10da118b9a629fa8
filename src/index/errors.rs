//! Index error types
//!
//! Error codes:
//! - AERO_INDEX_NOT_EMPTY (FATAL)

use std::fmt;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Contract violation, caller must fix state before retrying
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Populate called on an index that already holds keys
    AeroIndexNotEmpty,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::AeroIndexNotEmpty => "AERO_INDEX_NOT_EMPTY",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug, Clone)]
pub struct IndexError {
    code: IndexErrorCode,
    message: String,
    index: String,
}

impl IndexError {
    /// Populate attempted on a non-empty index
    pub fn not_empty(index: impl Into<String>, keys: usize) -> Self {
        let index = index.into();
        Self {
            code: IndexErrorCode::AeroIndexNotEmpty,
            message: format!("index '{}' already holds {} keys; clear it before populating", index, keys),
            index,
        }
    }

    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the index that failed
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Index errors are contract violations and never transient
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
