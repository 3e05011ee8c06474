//! Entity fixtures: a JSON file that stands in for the host application's
//! entity stores.
//!
//! ```json
//! {
//!   "ASSET": {
//!     "unique": ["assetName"],
//!     "records": [{"id": 1, "assetName": "Laptop"}]
//!   },
//!   "VENDOR": [{"id": 7, "email": "ops@acme.test"}]
//! }
//! ```
//!
//! An entity type maps either to a plain record array or to an object with
//! `records`, optional `unique` fields and an optional declared `fields`
//! list. Without `fields`, the union of keys across the records is the
//! type's field set.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use warden_engine::records::JsonRecord;
use warden_engine::registry::{EntityRegistry, InMemorySource};

/// Fixtures path used when a command gets no `--entities` flag.
pub const DEFAULT_FIXTURES_FILE: &str = "entities.json";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FixtureSet {
    Records(Vec<Value>),
    Detailed {
        records: Vec<Value>,
        #[serde(default)]
        unique: Vec<String>,
        #[serde(default)]
        fields: Option<Vec<String>>,
    },
}

/// Build an entity registry from a fixtures file.
///
/// A missing file yields an empty registry when `required` is false.
pub fn load_registry(path: &Path, required: bool) -> anyhow::Result<EntityRegistry> {
    if !path.exists() {
        if required {
            anyhow::bail!("entity fixtures file not found: {}", path.display());
        }
        tracing::debug!(path = %path.display(), "no entity fixtures file; registry is empty");
        return Ok(EntityRegistry::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read entity fixtures at {}", path.display()))?;
    parse_registry(&raw)
        .with_context(|| format!("invalid entity fixtures at {}", path.display()))
}

fn parse_registry(raw: &str) -> anyhow::Result<EntityRegistry> {
    let sets: BTreeMap<String, FixtureSet> = serde_json::from_str(raw)?;
    let mut registry = EntityRegistry::new();
    for (entity_type, set) in sets {
        let (values, unique, fields) = match set {
            FixtureSet::Records(records) => (records, Vec::new(), None),
            FixtureSet::Detailed {
                records,
                unique,
                fields,
            } => (records, unique, fields),
        };

        let records: Vec<JsonRecord> = values
            .into_iter()
            .filter_map(JsonRecord::from_value)
            .collect();
        let known: Arc<BTreeSet<String>> = Arc::new(fields.map_or_else(
            || JsonRecord::field_set(&records),
            |declared| declared.into_iter().collect(),
        ));
        let records = records
            .into_iter()
            .map(|r| r.with_known_fields(Arc::clone(&known)));

        let unique: Vec<&str> = unique.iter().map(String::as_str).collect();
        let source = InMemorySource::new(records).unique_on(&unique);
        tracing::debug!(entity_type, records = source.len(), "loaded entity fixtures");
        registry.register(&entity_type, Arc::new(source));
    }
    Ok(registry)
}
