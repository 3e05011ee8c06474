use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::json;
use warden_config::PROJECT_DIR;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::context::AppContext;
use crate::output::output;

const CONFIG_TEMPLATE: &str = "\
# Warden project configuration. WARDEN_* environment variables override these.

[database]
path = \".warden/warden.db\"

[engine]
bulk_concurrency = 8
recent_window_days = 7
seed_on_startup = true
system_actor = \"SYSTEM\"
default_severity = \"MEDIUM\"
";

/// Handle `wdn init`.
pub async fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = match &args.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let created = create_project_dir(&root)?;

    let config = bootstrap::load_config(&root)?;
    let ctx = AppContext::init(root.clone(), config).await?;

    let catalog = ctx.service.seed_catalog().await?;
    ctx.catalog.refresh().await?;
    let rules = if args.skip_default_rules {
        None
    } else {
        Some(ctx.service.initialize_default_rules(ctx.actor()).await?)
    };
    tracing::info!(root = %root.display(), created, "warden project initialized");

    output(
        &json!({
            "project_root": root,
            "created": created,
            "catalog": catalog,
            "rules": rules,
        }),
        flags.format,
    )
}

/// Create `.warden/` with a starter config. Returns false if it existed.
fn create_project_dir(root: &Path) -> anyhow::Result<bool> {
    let dir: PathBuf = root.join(PROJECT_DIR);
    if dir.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let config_path = dir.join("config.toml");
    std::fs::write(&config_path, CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    Ok(true)
}
