use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Catalog { action } => commands::catalog::handle(&action, ctx, flags).await,
        Commands::Rule { action } => commands::rule::handle(&action, ctx, flags).await,
        Commands::Validate(args) => commands::validate::handle(&args, ctx, flags).await,
        Commands::Violation { action } => commands::violation::handle(&action, ctx, flags).await,
        Commands::Report(args) => commands::report::handle(&args, ctx, flags).await,
        Commands::Metrics(args) => commands::metrics::handle(&args, ctx, flags).await,
        Commands::Summary => commands::metrics::handle_summary(ctx, flags).await,
        Commands::Init(_) => unreachable!("init is pre-dispatched in main"),
    }
}
