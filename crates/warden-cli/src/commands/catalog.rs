use std::collections::BTreeMap;

use anyhow::Context;
use serde_json::json;
use warden_core::enums::CatalogKind;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CatalogCommands;
use crate::commands::shared::parse::parse_catalog_kind;
use crate::context::AppContext;
use crate::output::output;

/// Handle `wdn catalog`.
pub async fn handle(
    action: &CatalogCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        CatalogCommands::List { kind } => {
            let kinds = match kind {
                Some(raw) => vec![parse_catalog_kind(raw)?],
                None => CatalogKind::ALL.to_vec(),
            };
            let listing: BTreeMap<&str, _> = kinds
                .into_iter()
                .map(|kind| (kind.as_str(), ctx.catalog.list_all(kind)))
                .collect();
            output(&listing, flags.format)
        }
        CatalogCommands::Get { kind, code } => {
            let kind = parse_catalog_kind(kind)?;
            let entry = ctx
                .catalog
                .lookup(kind, code)
                .await
                .with_context(|| format!("{kind} not found: {code}"))?;
            output(&entry, flags.format)
        }
        CatalogCommands::Seed => {
            let report = ctx.service.seed_catalog().await?;
            ctx.catalog.refresh().await?;
            output(&json!({ "seeded": report }), flags.format)
        }
    }
}
