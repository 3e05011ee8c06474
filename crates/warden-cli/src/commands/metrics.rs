use crate::cli::GlobalFlags;
use crate::cli::root_commands::MetricsArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `wdn metrics`.
pub async fn handle(
    args: &MetricsArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let metrics = ctx.metrics(ctx.registry(args.entities.as_deref())?);
    let result = match &args.entity_type {
        Some(entity_type) => metrics.metrics_for_entity_type(entity_type).await?,
        None => metrics.overall_metrics().await?,
    };
    output(&result, flags.format)
}

/// Handle `wdn summary`.
pub async fn handle_summary(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let summary = ctx
        .metrics(ctx.registry(None)?)
        .violations_summary()
        .await?;
    output(&summary, flags.format)
}
