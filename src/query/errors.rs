//! Query error types
//!
//! Error codes:
//! - AERO_QUERY_SYNTAX (REJECT)
//! - AERO_QUERY_UNKNOWN_INDEX (REJECT)

use std::fmt;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, store untouched
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Query-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed filter expression
    AeroQuerySyntax,
    /// Filter names an index that is not registered
    AeroQueryUnknownIndex,
}

impl QueryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::AeroQuerySyntax => "AERO_QUERY_SYNTAX",
            QueryErrorCode::AeroQueryUnknownIndex => "AERO_QUERY_UNKNOWN_INDEX",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with context
#[derive(Debug, Clone)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    index: Option<String>,
}

impl QueryError {
    /// Malformed filter expression
    pub fn syntax(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::AeroQuerySyntax,
            message: reason.into(),
            index: None,
        }
    }

    /// Unregistered index name
    pub fn unknown_index(index: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            code: QueryErrorCode::AeroQueryUnknownIndex,
            message: format!("Index '{}' does not exist", index),
            index: Some(index),
        }
    }

    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The index name, for lookup errors
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn is_syntax(&self) -> bool {
        self.code == QueryErrorCode::AeroQuerySyntax
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_match() {
        assert_eq!(QueryErrorCode::AeroQuerySyntax.code(), "AERO_QUERY_SYNTAX");
        assert_eq!(QueryErrorCode::AeroQueryUnknownIndex.code(), "AERO_QUERY_UNKNOWN_INDEX");
    }

    #[test]
    fn test_unknown_index_display() {
        let err = QueryError::unknown_index("age");
        let display = format!("{}", err);
        assert!(display.contains("REJECT"));
        assert!(display.contains("AERO_QUERY_UNKNOWN_INDEX"));
        assert!(display.contains("age"));
        assert_eq!(err.index(), Some("age"));
        assert!(!err.is_syntax());
    }
}
