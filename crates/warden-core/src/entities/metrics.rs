use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::violation::Violation;

/// Aggregate compliance numbers, optionally scoped to one entity type.
///
/// Entity counts come from the entity sources; violation counts from the
/// store. `non_compliant_entities` counts distinct entities with at least one
/// unresolved violation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ComplianceMetrics {
    pub entity_type: Option<String>,
    pub total_entities: u64,
    pub compliant_entities: u64,
    pub non_compliant_entities: u64,
    pub total_violations: u64,
    pub unresolved_violations: u64,
    pub by_severity: BTreeMap<String, u64>,
    pub by_entity_type: BTreeMap<String, u64>,
    pub generated_at: DateTime<Utc>,
}

impl ComplianceMetrics {
    /// Share of entities without unresolved violations, in percent.
    #[must_use]
    pub fn compliance_rate(&self) -> f64 {
        if self.total_entities == 0 {
            return 100.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.compliant_entities as f64 / self.total_entities as f64 * 100.0;
        rate
    }
}

/// Unresolved-violation overview with the most recent detections.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ViolationSummary {
    pub total: u64,
    pub by_severity: BTreeMap<String, u64>,
    /// Unresolved violations detected within the last `window_days`.
    pub recent_count: u64,
    pub recent_violations: Vec<Violation>,
    pub window_days: u32,
    pub generated_at: DateTime<Utc>,
}
