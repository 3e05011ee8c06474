use anyhow::Context;
use warden_engine::templates::find_template;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `wdn rule install-template`.
pub async fn install(key: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let template = find_template(key)
        .with_context(|| format!("unknown rule template '{key}' (see 'wdn rule templates')"))?;
    let rule = ctx.service.create_rule(&template.draft, ctx.actor()).await?;
    tracing::info!(template = %template.key, rule_id = %rule.id, "template installed");
    output(&rule, flags.format)
}
