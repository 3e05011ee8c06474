use warden_core::enums::CatalogKind;

/// Parse a catalog kind name such as `severity` or `resolution-status`.
pub fn parse_catalog_kind(raw: &str) -> anyhow::Result<CatalogKind> {
    raw.parse::<CatalogKind>()
        .map_err(|error| anyhow::anyhow!("invalid catalog kind '{raw}': {error}"))
}

/// Validate that a rule expression is a JSON object before it is stored.
pub fn parse_expression(raw: &str) -> anyhow::Result<String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(_)) => Ok(raw.to_string()),
        Ok(_) => anyhow::bail!("invalid expression '{raw}': expected a JSON object"),
        Err(error) => Err(anyhow::anyhow!("invalid expression '{raw}': {error}")),
    }
}
