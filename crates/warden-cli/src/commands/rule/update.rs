use warden_db::updates::rule::{RuleUpdate, RuleUpdateBuilder};

use crate::cli::subcommands::RuleFields;
use crate::commands::shared::parse::parse_expression;

#[derive(Default)]
pub struct ChangedFields<'a> {
    pub code: Option<&'a str>,
    pub name: Option<&'a str>,
    pub entity_type: Option<&'a str>,
    pub rule_type: Option<&'a str>,
    pub severity: Option<&'a str>,
    pub expression: Option<&'a str>,
}

/// Only flags that were passed become SET clauses.
pub fn build(changed: &ChangedFields<'_>, fields: &RuleFields) -> anyhow::Result<RuleUpdate> {
    let mut builder = RuleUpdateBuilder::new();
    if let Some(code) = changed.code {
        builder = builder.rule_code(code);
    }
    if let Some(name) = changed.name {
        builder = builder.rule_name(name);
    }
    if let Some(entity_type) = changed.entity_type {
        builder = builder.entity_type(entity_type);
    }
    if let Some(rule_type) = changed.rule_type {
        builder = builder.rule_type(rule_type);
    }
    if let Some(severity) = changed.severity {
        builder = builder.severity(severity);
    }
    if let Some(expression) = changed.expression {
        builder = builder.rule_expression(parse_expression(expression)?);
    }
    if let Some(description) = &fields.description {
        builder = builder.description(Some(description.clone()));
    }
    if let Some(message) = &fields.error_message {
        builder = builder.error_message(Some(message.clone()));
    }
    if let Some(blocking) = fields.blocking {
        builder = builder.blocks_operation(blocking);
    }
    if let Some(priority) = fields.priority {
        builder = builder.priority(priority);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_is_an_empty_update() {
        let update = build(&ChangedFields::default(), &RuleFields::default()).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn passed_flags_are_set() {
        let changed = ChangedFields {
            severity: Some("low"),
            ..ChangedFields::default()
        };
        let fields = RuleFields {
            priority: Some(7),
            ..RuleFields::default()
        };
        let update = build(&changed, &fields).unwrap();
        assert_eq!(update.severity.as_deref(), Some("LOW"));
        assert_eq!(update.priority, Some(7));
        assert!(update.rule_expression.is_none());
    }
}
