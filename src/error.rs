//! Error types for pattern construction, rewriting and translation.
//!
//! Rewriting itself is total; errors arise when a pattern is assembled from
//! boolean clauses, when the execution context cannot resolve a field, or when
//! a backend refuses a translated query.

/// Query errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Boolean clause list without any MUST or SHOULD clause.
    #[error("query must contain included terms")]
    NoIncludedTerms,

    /// Unknown annotated field or property at translation time.
    #[error("field not found: {field}%{property}")]
    FieldNotFound { field: String, property: String },

    /// A pattern with no positive clause reached the translator. This is a
    /// rewrite-engine bug, not a user error.
    #[error("cannot translate negative-only pattern {pattern}")]
    UntranslatableNegativePattern { pattern: String },

    /// Reported by a backend, e.g. when a wildcard expands to too many terms.
    #[error("query too broad: {pattern} ({reason})")]
    QueryTooBroad { pattern: String, reason: String },

    /// A composite without clauses (`OR()`, `SEQ()`) cannot be translated.
    #[error("{operator} requires at least one clause")]
    EmptyClauseList { operator: &'static str },

    #[error("invalid search defaults: {0}")]
    InvalidDefaults(String),

    #[error("search defaults were already installed")]
    DefaultsAlreadyInstalled,

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

impl QueryError {
    pub fn field_not_found(field: impl Into<String>, property: impl Into<String>) -> Self {
        QueryError::FieldNotFound {
            field: field.into(),
            property: property.into(),
        }
    }

    pub fn too_broad(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::QueryTooBroad {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
