use warden_db::repos::violation::ViolationFilter;
use warden_engine::EntityRegistry;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ViolationCommands;
use crate::commands::shared::limit::{effective_limit, truncate};
use crate::context::AppContext;
use crate::output::output;

/// Handle `wdn violation`.
pub async fn handle(
    action: &ViolationCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ViolationCommands::List {
            entity_type,
            entity_id,
            severity,
            all,
            limit,
        } => {
            let violations = if *all {
                match (entity_type, entity_id) {
                    (Some(entity_type), Some(entity_id)) => {
                        ctx.service
                            .list_violations(entity_type, entity_id, false)
                            .await?
                    }
                    _ => anyhow::bail!("--all requires --entity-type and --entity-id"),
                }
            } else {
                let filter = ViolationFilter {
                    entity_type: entity_type.clone(),
                    entity_id: entity_id.clone(),
                    severity: severity.clone(),
                    detected_since: None,
                };
                ctx.service.list_unresolved_violations(&filter).await?
            };
            let limit = effective_limit(
                *limit,
                flags.limit,
                ctx.config.general.default_limit,
            );
            output(&truncate(violations, limit), flags.format)
        }
        ViolationCommands::Get { id } => {
            let violation = ctx.service.get_violation(id).await?;
            output(&violation, flags.format)
        }
        ViolationCommands::Resolve {
            id,
            by,
            notes,
            status,
        } => {
            let resolved_by = by.as_deref().unwrap_or_else(|| ctx.actor());
            let violation = ctx
                .agent(EntityRegistry::new())
                .resolve_violation_with_status(id, resolved_by, notes.as_deref(), status)
                .await?;
            output(&violation, flags.format)
        }
    }
}
