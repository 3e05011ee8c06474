use warden_core::entities::RuleDraft;

use crate::cli::subcommands::RuleFields;
use crate::commands::shared::parse::parse_expression;

pub struct RequiredFields<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub entity_type: &'a str,
    pub rule_type: &'a str,
    pub severity: &'a str,
    pub expression: &'a str,
}

/// Build a draft from command-line values. `blocking` left unset defers to
/// the severity's default when the rule is stored.
pub fn draft(required: &RequiredFields<'_>, fields: &RuleFields) -> anyhow::Result<RuleDraft> {
    let mut draft = RuleDraft::new(
        required.code,
        required.name,
        required.entity_type,
        required.rule_type,
        required.severity,
        parse_expression(required.expression)?,
    );
    if let Some(description) = &fields.description {
        draft = draft.description(description.clone());
    }
    if let Some(message) = &fields.error_message {
        draft = draft.error_message(message.clone());
    }
    if let Some(blocking) = fields.blocking {
        draft = draft.blocking(blocking);
    }
    if let Some(priority) = fields.priority {
        draft = draft.priority(priority);
    }
    Ok(draft)
}
