//! Read-only rollups over the unresolved violation set.
//!
//! Every figure is computed from `list_unresolved_violations`, the same set
//! the violation store exposes, so there are no separate counters to drift.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::warn;
use warden_config::EngineConfig;
use warden_core::entities::{ComplianceMetrics, Violation, ViolationSummary};
use warden_core::ids::normalize_tag;
use warden_db::repos::violation::ViolationFilter;
use warden_db::service::WardenService;

use crate::error::ComplianceError;
use crate::registry::EntityRegistry;

/// How many recent violations a summary lists.
const RECENT_LIST_LIMIT: usize = 10;

pub struct MetricsAggregator {
    store: Arc<WardenService>,
    registry: EntityRegistry,
    window_days: u32,
}

impl MetricsAggregator {
    #[must_use]
    pub fn new(store: Arc<WardenService>, registry: EntityRegistry, config: &EngineConfig) -> Self {
        Self {
            store,
            registry,
            window_days: config.recent_window_days,
        }
    }

    /// Metrics across every entity type.
    ///
    /// # Errors
    ///
    /// Returns `ComplianceError` if violations or entity counts cannot be read.
    pub async fn overall_metrics(&self) -> Result<ComplianceMetrics, ComplianceError> {
        let open = self
            .store
            .list_unresolved_violations(&ViolationFilter::default())
            .await?;
        let mut total_entities = 0;
        for entity_type in self.registry.entity_types() {
            total_entities += self.entity_count(&entity_type).await?;
        }
        Ok(rollup(None, total_entities, &open, |t| {
            self.registry.get(t).is_some()
        }))
    }

    /// Metrics for one entity type.
    ///
    /// # Errors
    ///
    /// Returns `ComplianceError` if violations or the entity count cannot be
    /// read.
    pub async fn metrics_for_entity_type(
        &self,
        entity_type: &str,
    ) -> Result<ComplianceMetrics, ComplianceError> {
        let entity_type = normalize_tag(entity_type);
        let open = self
            .store
            .list_unresolved_violations(&ViolationFilter::for_entity_type(&entity_type))
            .await?;
        let total_entities = self.entity_count(&entity_type).await?;
        Ok(rollup(Some(entity_type), total_entities, &open, |t| {
            self.registry.get(t).is_some()
        }))
    }

    /// Unresolved totals plus activity within the configured window.
    ///
    /// # Errors
    ///
    /// Returns `ComplianceError::Database` if violations cannot be read.
    pub async fn violations_summary(&self) -> Result<ViolationSummary, ComplianceError> {
        let open = self
            .store
            .list_unresolved_violations(&ViolationFilter::default())
            .await?;
        let since = Utc::now() - Duration::days(i64::from(self.window_days));
        let mut recent: Vec<Violation> = open
            .iter()
            .filter(|v| v.detected_at >= since)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        let recent_count = recent.len() as u64;
        recent.truncate(RECENT_LIST_LIMIT);

        Ok(ViolationSummary {
            total: open.len() as u64,
            by_severity: count_by(&open, |v| &v.severity),
            recent_count,
            recent_violations: recent,
            window_days: self.window_days,
            generated_at: Utc::now(),
        })
    }

    /// Registered source count; an unregistered type has no known entities.
    async fn entity_count(&self, entity_type: &str) -> Result<u64, ComplianceError> {
        match self.registry.get(entity_type) {
            Some(source) => Ok(source.count().await?),
            None => {
                warn!(entity_type, "no entity source registered, counting zero entities");
                Ok(0)
            }
        }
    }
}

fn count_by(
    violations: &[Violation],
    key: impl Fn(&Violation) -> &String,
) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for v in violations {
        *counts.entry(key(v).clone()).or_default() += 1;
    }
    counts
}

/// Every figure comes from `open`. Only entities whose type passes
/// `registered` count as non-compliant, since `total_entities` covers those
/// types alone.
fn rollup(
    entity_type: Option<String>,
    total_entities: u64,
    open: &[Violation],
    registered: impl Fn(&str) -> bool,
) -> ComplianceMetrics {
    let non_compliant: BTreeSet<(&str, &str)> = open
        .iter()
        .filter(|v| registered(v.entity_type.as_str()))
        .map(|v| (v.entity_type.as_str(), v.entity_id.as_str()))
        .collect();
    let non_compliant_entities = non_compliant.len() as u64;
    ComplianceMetrics {
        entity_type,
        total_entities,
        compliant_entities: total_entities.saturating_sub(non_compliant_entities),
        non_compliant_entities,
        total_violations: open.len() as u64,
        unresolved_violations: open.len() as u64,
        by_severity: count_by(open, |v| &v.severity),
        by_entity_type: count_by(open, |v| &v.entity_type),
        generated_at: Utc::now(),
    }
}
