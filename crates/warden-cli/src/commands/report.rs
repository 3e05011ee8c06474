use warden_engine::EntityRegistry;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReportArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `wdn report`. Read-only and independent of entity fixtures.
pub async fn handle(
    args: &ReportArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let report = ctx
        .agent(EntityRegistry::new())
        .generate_compliance_report(&args.entity_type, &args.entity_id)
        .await?;
    output(&report, flags.format)
}
