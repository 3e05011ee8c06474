use std::path::Path;

use anyhow::Context;
use warden_config::WardenConfig;

/// Load the project's `.env` (if any), then the layered configuration.
///
/// The project-level `.warden/config.toml` is resolved relative to the
/// working directory, so the process switches into the project root first.
pub fn load_config(project_root: &Path) -> anyhow::Result<WardenConfig> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }

    std::env::set_current_dir(project_root).with_context(|| {
        format!(
            "failed to enter project root {}",
            project_root.display()
        )
    })?;

    WardenConfig::load().context("failed to load warden configuration")
}
