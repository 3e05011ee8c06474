mod create;
mod templates;
mod update;

use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RuleCommands;
use crate::commands::shared::limit::{effective_limit, truncate};
use crate::context::AppContext;
use crate::output::output;

/// Handle `wdn rule`.
pub async fn handle(
    action: &RuleCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        RuleCommands::List { entity_type, limit } => {
            let rules = match entity_type {
                Some(entity_type) => ctx.service.list_rules_by_entity_type(entity_type).await?,
                None => ctx.service.list_rules().await?,
            };
            let limit = effective_limit(*limit, flags.limit, ctx.config.general.default_limit);
            output(&truncate(rules, limit), flags.format)
        }
        RuleCommands::Get { id } => output(&ctx.service.get_rule(id).await?, flags.format),
        RuleCommands::Create {
            code,
            name,
            entity_type,
            rule_type,
            severity,
            expression,
            fields,
        } => {
            let draft = create::draft(
                &create::RequiredFields {
                    code,
                    name,
                    entity_type,
                    rule_type,
                    severity,
                    expression,
                },
                fields,
            )?;
            let rule = ctx.service.create_rule(&draft, ctx.actor()).await?;
            output(&rule, flags.format)
        }
        RuleCommands::Update {
            id,
            code,
            name,
            entity_type,
            rule_type,
            severity,
            expression,
            fields,
        } => {
            let update = update::build(
                &update::ChangedFields {
                    code: code.as_deref(),
                    name: name.as_deref(),
                    entity_type: entity_type.as_deref(),
                    rule_type: rule_type.as_deref(),
                    severity: severity.as_deref(),
                    expression: expression.as_deref(),
                },
                fields,
            )?;
            let rule = ctx.service.update_rule(id, &update, ctx.actor()).await?;
            output(&rule, flags.format)
        }
        RuleCommands::Delete { id } => {
            ctx.service.soft_delete_rule(id, ctx.actor()).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        RuleCommands::Templates => {
            output(&warden_engine::templates::available_templates(), flags.format)
        }
        RuleCommands::InstallTemplate { key } => templates::install(key, ctx, flags).await,
        RuleCommands::Seed => {
            let report = ctx.service.initialize_default_rules(ctx.actor()).await?;
            output(&json!({ "seeded": report }), flags.format)
        }
    }
}
