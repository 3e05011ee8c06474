//! Entity registry: entity-type tag to the source that owns those entities.
//!
//! The engine knows nothing about how assets, vendors or warranties are
//! stored. Each owning module registers an [`EntitySource`] under its tag at
//! startup; record fetches, reference checks and uniqueness checks all go
//! through it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use warden_core::field::FieldValue;
use warden_core::ids::normalize_tag;

use crate::error::SourceError;
use crate::records::EntityRecord;

/// Lookup capability for one entity type.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// The record with this id, if it exists.
    async fn fetch(&self, id: &str) -> Result<Option<Box<dyn EntityRecord>>, SourceError>;

    /// Whether a record with this id exists.
    async fn exists_by_id(&self, id: &str) -> Result<bool, SourceError> {
        Ok(self.fetch(id).await?.is_some())
    }

    /// Whether another record (not `exclude_id`) already holds `value` in
    /// `field`. `None` when this source has no uniqueness check for `field`.
    async fn value_taken(
        &self,
        field: &str,
        value: &FieldValue,
        exclude_id: Option<&str>,
    ) -> Result<Option<bool>, SourceError>;

    /// Number of records, used by the metrics rollups.
    async fn count(&self) -> Result<u64, SourceError>;
}

/// Tag to source table, normalized to upper case.
#[derive(Clone, Default)]
pub struct EntityRegistry {
    sources: HashMap<String, Arc<dyn EntitySource>>,
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("sources", &self.sources.keys().collect::<BTreeSet<_>>())
            .finish()
    }
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the source for `entity_type`.
    pub fn register(&mut self, entity_type: &str, source: Arc<dyn EntitySource>) {
        self.sources.insert(normalize_tag(entity_type), source);
    }

    #[must_use]
    pub fn with(mut self, entity_type: &str, source: Arc<dyn EntitySource>) -> Self {
        self.register(entity_type, source);
        self
    }

    #[must_use]
    pub fn get(&self, entity_type: &str) -> Option<&Arc<dyn EntitySource>> {
        self.sources.get(&normalize_tag(entity_type))
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn entity_types(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.sources.keys().cloned().collect();
        tags.sort_unstable();
        tags
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// In-memory source over cloneable records.
///
/// Used by the CLI for fixture files and by tests. Uniqueness checks are
/// available only for the fields named in `unique_fields`; values compare
/// trimmed and case-insensitively.
pub struct InMemorySource<R> {
    records: BTreeMap<String, R>,
    unique_fields: BTreeSet<String>,
}

impl<R: EntityRecord + Clone + 'static> InMemorySource<R> {
    /// Index records by their id. Records without an id are skipped.
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = R>) -> Self {
        let records = records
            .into_iter()
            .filter_map(|r| r.id().map(|id| (id, r)))
            .collect();
        Self {
            records,
            unique_fields: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn unique_on(mut self, fields: &[&str]) -> Self {
        self.unique_fields
            .extend(fields.iter().map(|f| (*f).to_string()));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn comparable(value: &FieldValue) -> Option<String> {
    value.render().map(|s| s.trim().to_lowercase())
}

#[async_trait]
impl<R: EntityRecord + Clone + 'static> EntitySource for InMemorySource<R> {
    async fn fetch(&self, id: &str) -> Result<Option<Box<dyn EntityRecord>>, SourceError> {
        Ok(self
            .records
            .get(id.trim())
            .map(|r| Box::new(r.clone()) as Box<dyn EntityRecord>))
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, SourceError> {
        Ok(self.records.contains_key(id.trim()))
    }

    async fn value_taken(
        &self,
        field: &str,
        value: &FieldValue,
        exclude_id: Option<&str>,
    ) -> Result<Option<bool>, SourceError> {
        if !self.unique_fields.contains(field) {
            return Ok(None);
        }
        let Some(needle) = comparable(value) else {
            return Ok(Some(false));
        };
        let taken = self
            .records
            .iter()
            .filter(|(id, _)| Some(id.as_str()) != exclude_id)
            .filter_map(|(_, r)| r.field(field))
            .any(|v| comparable(&v).as_deref() == Some(needle.as_str()));
        Ok(Some(taken))
    }

    async fn count(&self) -> Result<u64, SourceError> {
        Ok(self.records.len() as u64)
    }
}
