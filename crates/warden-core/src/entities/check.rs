use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::violation::Violation;
use crate::enums::CheckOutcome;

/// Outcome of evaluating one rule against one entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: Option<String>,
    pub field: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl ValidationResult {
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            valid: true,
            message: None,
            field: None,
            expected: None,
            actual: None,
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            field: None,
            expected: None,
            actual: None,
        }
    }

    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    #[must_use]
    pub fn actual(mut self, actual: Option<String>) -> Self {
        self.actual = actual;
        self
    }
}

/// Outcome of checking one entity against all of its active rules.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CheckResult {
    pub entity_type: String,
    pub entity_id: String,
    pub outcome: CheckOutcome,
    pub compliant: bool,
    pub has_blocking_violations: bool,
    pub rules_evaluated: usize,
    pub violations: Vec<Violation>,
    pub message: String,
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    /// No active rules exist for the entity type.
    #[must_use]
    pub fn no_rules(entity_type: &str, entity_id: &str) -> Self {
        Self::base(
            entity_type,
            entity_id,
            CheckOutcome::NoRules,
            true,
            format!("No rules defined for entity type {entity_type}"),
        )
    }

    /// Rules ran; `violations` are the ones recorded during this check.
    #[must_use]
    pub fn evaluated(
        entity_type: &str,
        entity_id: &str,
        rules_evaluated: usize,
        violations: Vec<Violation>,
    ) -> Self {
        let compliant = violations.is_empty();
        let message = if compliant {
            "Entity is compliant".to_string()
        } else {
            format!("Entity has {} compliance violations", violations.len())
        };
        let mut result = Self::base(
            entity_type,
            entity_id,
            CheckOutcome::Evaluated,
            compliant,
            message,
        );
        result.has_blocking_violations = violations.iter().any(|v| v.blocks_operation);
        result.rules_evaluated = rules_evaluated;
        result.violations = violations;
        result
    }

    #[must_use]
    pub fn not_found(entity_type: &str, entity_id: &str) -> Self {
        Self::base(
            entity_type,
            entity_id,
            CheckOutcome::EntityNotFound,
            false,
            format!("Entity not found: {entity_type} {entity_id}"),
        )
    }

    #[must_use]
    pub fn error(entity_type: &str, entity_id: &str, message: impl Into<String>) -> Self {
        Self::base(
            entity_type,
            entity_id,
            CheckOutcome::Error,
            false,
            message.into(),
        )
    }

    /// Violations that block the pending operation.
    pub fn blocking_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.blocks_operation)
    }

    fn base(
        entity_type: &str,
        entity_id: &str,
        outcome: CheckOutcome,
        compliant: bool,
        message: String,
    ) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            outcome,
            compliant,
            has_blocking_violations: false,
            rules_evaluated: 0,
            violations: Vec::new(),
            message,
            checked_at: Utc::now(),
        }
    }
}

/// Compliance posture of one entity, built from its unresolved violations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ComplianceReport {
    pub entity_type: String,
    pub entity_id: String,
    /// `COMPLIANT` or `NON_COMPLIANT`.
    pub status: String,
    pub total_violations: usize,
    /// Every active severity code is present, zero-filled.
    pub violations_by_severity: BTreeMap<String, u64>,
    pub violations: Vec<Violation>,
    pub generated_at: DateTime<Utc>,
}
