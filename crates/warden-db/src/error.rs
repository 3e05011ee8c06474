//! Database error types for warden-db.

use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A record addressed by id does not exist (or is soft-deleted).
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Another active rule already uses this code for the entity type.
    #[error("Rule code '{rule_code}' already exists for entity type '{entity_type}'")]
    DuplicateRule {
        rule_code: String,
        entity_type: String,
    },

    /// Input rejected before any write.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

impl DatabaseError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether a libSQL error is a UNIQUE constraint violation.
    pub(crate) fn is_unique_violation(err: &libsql::Error) -> bool {
        err.to_string().contains("UNIQUE constraint failed")
    }
}
