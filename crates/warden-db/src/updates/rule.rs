//! Rule update builder.

use serde::Serialize;
use warden_core::ids::normalize_tag;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks_operation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl RuleUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rule_code.is_none()
            && self.rule_name.is_none()
            && self.description.is_none()
            && self.entity_type.is_none()
            && self.rule_type.is_none()
            && self.severity.is_none()
            && self.rule_expression.is_none()
            && self.error_message.is_none()
            && self.blocks_operation.is_none()
            && self.priority.is_none()
    }
}

#[derive(Debug, Default)]
pub struct RuleUpdateBuilder(RuleUpdate);

impl RuleUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(RuleUpdate::default())
    }

    #[must_use]
    pub fn rule_code(mut self, code: &str) -> Self {
        self.0.rule_code = Some(normalize_tag(code));
        self
    }

    #[must_use]
    pub fn rule_name(mut self, name: impl Into<String>) -> Self {
        self.0.rule_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn entity_type(mut self, entity_type: &str) -> Self {
        self.0.entity_type = Some(normalize_tag(entity_type));
        self
    }

    #[must_use]
    pub fn rule_type(mut self, rule_type: &str) -> Self {
        self.0.rule_type = Some(normalize_tag(rule_type));
        self
    }

    #[must_use]
    pub fn severity(mut self, severity: &str) -> Self {
        self.0.severity = Some(normalize_tag(severity));
        self
    }

    #[must_use]
    pub fn rule_expression(mut self, expression: impl Into<String>) -> Self {
        self.0.rule_expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn error_message(mut self, message: Option<String>) -> Self {
        self.0.error_message = Some(message);
        self
    }

    #[must_use]
    pub const fn blocks_operation(mut self, blocks: bool) -> Self {
        self.0.blocks_operation = Some(blocks);
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.0.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn build(self) -> RuleUpdate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_normalizes_tags() {
        let update = RuleUpdateBuilder::new()
            .rule_code("asset_tag_required")
            .entity_type(" asset ")
            .severity("low")
            .build();
        assert_eq!(update.rule_code.as_deref(), Some("ASSET_TAG_REQUIRED"));
        assert_eq!(update.entity_type.as_deref(), Some("ASSET"));
        assert_eq!(update.severity.as_deref(), Some("LOW"));
    }

    #[test]
    fn empty_update_serializes_to_empty_object() {
        let update = RuleUpdateBuilder::new().build();
        assert!(update.is_empty());
        assert_eq!(serde_json::to_string(&update).unwrap(), "{}");
    }

    #[test]
    fn clearing_description_is_not_empty() {
        let update = RuleUpdateBuilder::new().description(None).build();
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"description":null}"#
        );
    }
}
