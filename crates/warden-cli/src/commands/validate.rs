use warden_core::entities::CheckResult;
use warden_engine::ensure_not_blocked;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ValidateArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `wdn validate`.
///
/// Results are printed before `--enforce` is applied, so a blocked run still
/// shows every violation it recorded.
pub async fn handle(
    args: &ValidateArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let registry = ctx.registry(args.entities.as_deref())?;
    if registry.is_empty() {
        tracing::warn!(
            path = %ctx.default_fixtures_path().display(),
            "no entity fixtures loaded; every id will report an unknown entity type"
        );
    }

    let results = ctx
        .agent(registry)
        .validate_bulk(&args.entity_type, &args.ids)
        .await;
    output(&results, flags.format)?;

    if args.enforce {
        enforce(&results)?;
    }
    Ok(())
}

fn enforce(results: &[CheckResult]) -> anyhow::Result<()> {
    let blocked: Vec<String> = results
        .iter()
        .filter_map(|result| ensure_not_blocked(result).err())
        .map(|error| error.to_string())
        .collect();
    if blocked.is_empty() {
        return Ok(());
    }
    anyhow::bail!("{}", blocked.join("\n"))
}
