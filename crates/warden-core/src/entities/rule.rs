use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::normalize_tag;

/// A persisted compliance rule.
///
/// `rule_type` and `severity` hold catalog codes. `rule_expression` is the raw
/// JSON document; it is parsed per evaluation so a malformed document fails
/// only its own rule.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RuleDefinition {
    pub id: String,
    pub rule_code: String,
    pub rule_name: String,
    pub description: Option<String>,
    pub entity_type: String,
    pub rule_type: String,
    pub severity: String,
    pub rule_expression: String,
    pub error_message: Option<String>,
    pub blocks_operation: bool,
    /// Evaluation order: lower runs first.
    pub priority: i32,
    pub active: bool,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RuleDefinition {
    /// The message recorded when this rule fails, falling back to the
    /// evaluator's own message.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.error_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
    }
}

/// Input for creating a rule.
///
/// `blocks_operation` left as `None` takes the severity's default.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RuleDraft {
    pub rule_code: String,
    pub rule_name: String,
    pub description: Option<String>,
    pub entity_type: String,
    pub rule_type: String,
    pub severity: String,
    pub rule_expression: String,
    pub error_message: Option<String>,
    pub blocks_operation: Option<bool>,
    pub priority: i32,
}

impl RuleDraft {
    /// Start a draft. Tags and codes are trimmed and upper-cased.
    #[must_use]
    pub fn new(
        rule_code: &str,
        rule_name: &str,
        entity_type: &str,
        rule_type: &str,
        severity: &str,
        rule_expression: impl Into<String>,
    ) -> Self {
        Self {
            rule_code: normalize_tag(rule_code),
            rule_name: rule_name.trim().to_string(),
            description: None,
            entity_type: normalize_tag(entity_type),
            rule_type: normalize_tag(rule_type),
            severity: normalize_tag(severity),
            rule_expression: rule_expression.into(),
            error_message: None,
            blocks_operation: None,
            priority: 100,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    #[must_use]
    pub const fn blocking(mut self, blocks: bool) -> Self {
        self.blocks_operation = Some(blocks);
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_normalizes_tags() {
        let draft = RuleDraft::new(
            " asset_name_required ",
            " Asset name required ",
            "asset",
            "required_field",
            "critical",
            r#"{"field":"assetName"}"#,
        );
        assert_eq!(draft.rule_code, "ASSET_NAME_REQUIRED");
        assert_eq!(draft.rule_name, "Asset name required");
        assert_eq!(draft.entity_type, "ASSET");
        assert_eq!(draft.rule_type, "REQUIRED_FIELD");
        assert_eq!(draft.severity, "CRITICAL");
        assert_eq!(draft.blocks_operation, None);
    }

    #[test]
    fn draft_builder() {
        let draft = RuleDraft::new("C", "n", "ASSET", "REQUIRED_FIELD", "LOW", "{}")
            .blocking(true)
            .priority(3)
            .error_message("boom");
        assert_eq!(draft.blocks_operation, Some(true));
        assert_eq!(draft.priority, 3);
        assert_eq!(draft.error_message.as_deref(), Some("boom"));
    }
}
