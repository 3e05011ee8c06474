//! Engine, source, and agent error types.

use thiserror::Error;
use warden_core::entities::Violation;
use warden_db::error::DatabaseError;

/// A rule could not be evaluated as configured.
///
/// These describe the rule, not the entity. The agent records them as failed
/// rules with the error text as the message, so a broken rule is never
/// silently skipped.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Malformed rule expression for {rule_code}: {reason}")]
    MalformedExpression { rule_code: String, reason: String },

    #[error("Unknown field '{field}' on {entity_type}")]
    UnknownField { entity_type: String, field: String },

    #[error("No uniqueness check registered for {entity_type}.{field}")]
    NoUniquenessCheck { entity_type: String, field: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("No entity source registered for {0}")]
    UnknownEntityType(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Failures inside an entity source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Entity source unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors surfaced by the compliance agent and guard.
#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error(transparent)]
    Database(DatabaseError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Blocking violations stop the pending operation. Only the blocking
    /// violations are carried.
    #[error("Operation on {entity_type} {entity_id} blocked: {}", summarize(.violations))]
    Blocked {
        entity_type: String,
        entity_id: String,
        violations: Vec<Violation>,
    },
}

impl From<DatabaseError> for ComplianceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Database(other),
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.violation_message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
