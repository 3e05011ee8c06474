//! Compliance agent: runs an entity's rules, records what fails, and answers
//! status questions.
//!
//! The agent never aborts the write that triggered validation. It reports
//! `has_blocking_violations` and leaves the decision to the caller (see
//! [`crate::guard::ensure_not_blocked`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};
use warden_config::EngineConfig;
use warden_core::codes::{STATUS_COMPLIANT, STATUS_NON_COMPLIANT, UNKNOWN_STATUS};
use warden_core::entities::{
    CheckResult, ComplianceReport, NewViolation, ResolutionStatus, RuleDefinition, Violation,
};
use warden_core::ids::normalize_tag;
use warden_db::repos::violation::ViolationFilter;
use warden_db::service::WardenService;

use crate::catalog::CatalogStore;
use crate::error::ComplianceError;
use crate::records::EntityRecord;
use crate::registry::EntityRegistry;
use crate::rule_engine::RuleEngine;

pub struct ComplianceAgent {
    store: Arc<WardenService>,
    catalog: Arc<CatalogStore>,
    engine: RuleEngine,
    bulk_concurrency: usize,
}

impl ComplianceAgent {
    #[must_use]
    pub fn new(
        store: Arc<WardenService>,
        catalog: Arc<CatalogStore>,
        registry: EntityRegistry,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            engine: RuleEngine::new(registry),
            bulk_concurrency: config.bulk_concurrency.max(1),
        }
    }

    #[must_use]
    pub fn store(&self) -> &WardenService {
        &self.store
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    #[must_use]
    pub const fn registry(&self) -> &EntityRegistry {
        self.engine.registry()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Run every active rule for `entity_type` against `record`, in priority
    /// order, and persist a violation for each failure.
    ///
    /// # Errors
    ///
    /// Returns `ComplianceError::Database` if rules cannot be loaded or a
    /// violation cannot be written. Rule misconfiguration is not an error; it
    /// is recorded as a violation.
    pub async fn validate_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        record: &dyn EntityRecord,
    ) -> Result<CheckResult, ComplianceError> {
        let entity_type = normalize_tag(entity_type);
        let rules = self.store.list_rules_by_entity_type(&entity_type).await?;
        if rules.is_empty() {
            debug!(entity_type, entity_id, "no rules defined");
            return Ok(CheckResult::no_rules(&entity_type, entity_id));
        }

        let status = self.open_status().await;
        let mut violations = Vec::new();
        for rule in &rules {
            let result = self
                .engine
                .validate(rule, &entity_type, entity_id, record)
                .await;
            if result.valid {
                continue;
            }
            let new = NewViolation {
                rule_id: Some(rule.id.clone()),
                entity_type: entity_type.clone(),
                entity_id: entity_id.to_string(),
                severity: self.violation_severity(rule).await,
                blocks_operation: rule.blocks_operation,
                status: status.clone(),
                violation_message: result
                    .message
                    .unwrap_or_else(|| default_message(rule)),
                violated_field: result.field,
                expected_value: result.expected,
                actual_value: result.actual,
            };
            violations.push(self.store.record_violation(&new).await?);
        }

        let check = CheckResult::evaluated(&entity_type, entity_id, rules.len(), violations);
        if !check.compliant {
            info!(
                entity_type,
                entity_id,
                violations = check.violations.len(),
                blocking = check.has_blocking_violations,
                "compliance violations detected"
            );
        }
        Ok(check)
    }

    /// Fetch the record from the registered source, then validate it.
    ///
    /// An unregistered entity type yields an `error` result and an unknown id
    /// an `entity_not_found` result; neither is an `Err`.
    ///
    /// # Errors
    ///
    /// Returns `ComplianceError::Source` when the source fails, and the
    /// errors of [`validate_entity`](Self::validate_entity).
    pub async fn validate_entity_by_id(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<CheckResult, ComplianceError> {
        let entity_type = normalize_tag(entity_type);
        let Some(source) = self.registry().get(&entity_type) else {
            warn!(entity_type, "no entity source registered");
            return Ok(CheckResult::error(
                &entity_type,
                entity_id,
                format!("Unknown entity type: {entity_type}"),
            ));
        };
        let Some(record) = source.fetch(entity_id).await? else {
            return Ok(CheckResult::not_found(&entity_type, entity_id));
        };
        self.validate_entity(&entity_type, entity_id, record.as_ref())
            .await
    }

    /// Validate each id independently, at most `bulk_concurrency` at a time.
    ///
    /// Results are in input order. A failure on one id becomes an `error`
    /// result for that id and does not stop the rest.
    pub async fn validate_bulk(&self, entity_type: &str, ids: &[String]) -> Vec<CheckResult> {
        let results: Vec<CheckResult> = stream::iter(ids)
            .map(|id| async move {
                match self.validate_entity_by_id(entity_type, id).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(entity_type, entity_id = %id, error = %e, "bulk validation item failed");
                        CheckResult::error(
                            &normalize_tag(entity_type),
                            id,
                            format!("Error validating entity: {e}"),
                        )
                    }
                }
            })
            .buffered(self.bulk_concurrency)
            .collect()
            .await;
        info!(
            entity_type,
            total = results.len(),
            failed = results.iter().filter(|r| r.outcome.is_failure()).count(),
            "bulk validation finished"
        );
        results
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Mark a violation `COMPLIANT`.
    ///
    /// # Errors
    ///
    /// `ComplianceError::NotFound` for an unknown id.
    pub async fn resolve_violation(
        &self,
        violation_id: &str,
        resolved_by: &str,
        notes: Option<&str>,
    ) -> Result<Violation, ComplianceError> {
        self.resolve_violation_with_status(violation_id, resolved_by, notes, STATUS_COMPLIANT)
            .await
    }

    /// Move a violation into any resolved catalog status (e.g. `EXEMPTED`).
    ///
    /// # Errors
    ///
    /// `ComplianceError::InvalidState` when `status_code` is unknown or not a
    /// resolved status, `ComplianceError::NotFound` for an unknown id.
    pub async fn resolve_violation_with_status(
        &self,
        violation_id: &str,
        resolved_by: &str,
        notes: Option<&str>,
        status_code: &str,
    ) -> Result<Violation, ComplianceError> {
        let status = self
            .catalog
            .resolution_status(status_code)
            .await
            .ok_or_else(|| {
                ComplianceError::InvalidState(format!("Unknown resolution status: {status_code}"))
            })?;
        if !status.is_resolved {
            return Err(ComplianceError::InvalidState(format!(
                "{} is not a resolved status",
                status.code
            )));
        }
        let violation = self
            .store
            .resolve_violation(violation_id, &status.code, resolved_by, notes)
            .await?;
        info!(violation_id, status = %status.code, resolved_by, "violation resolved");
        Ok(violation)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// `COMPLIANT` when the entity has no unresolved violations, otherwise
    /// `NON_COMPLIANT`. `None` if the status is missing from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ComplianceError::Database` if violations cannot be read.
    pub async fn get_compliance_status(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Option<ResolutionStatus>, ComplianceError> {
        let open = self
            .store
            .list_unresolved_violations(&ViolationFilter::for_entity(entity_type, entity_id))
            .await?;
        Ok(if open.is_empty() {
            self.catalog.compliant_status().await
        } else {
            self.catalog.non_compliant_status().await
        })
    }

    /// Whether the entity's current status is `COMPLIANT`.
    ///
    /// # Errors
    ///
    /// Returns `ComplianceError::Database` if violations cannot be read.
    pub async fn is_compliant(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<bool, ComplianceError> {
        Ok(self
            .get_compliance_status(entity_type, entity_id)
            .await?
            .is_some_and(|s| s.is_resolved && s.code == STATUS_COMPLIANT))
    }

    /// Active violations for one entity, optionally unresolved only.
    ///
    /// # Errors
    ///
    /// Returns `ComplianceError::Database` if violations cannot be read.
    pub async fn get_violations(
        &self,
        entity_type: &str,
        entity_id: &str,
        unresolved_only: bool,
    ) -> Result<Vec<Violation>, ComplianceError> {
        Ok(self
            .store
            .list_violations(entity_type, entity_id, unresolved_only)
            .await?)
    }

    /// Current status plus unresolved counts for every catalog severity.
    /// Read-only.
    ///
    /// # Errors
    ///
    /// Returns `ComplianceError::Database` if violations cannot be read.
    pub async fn generate_compliance_report(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<ComplianceReport, ComplianceError> {
        let entity_type = normalize_tag(entity_type);
        let status = self
            .get_compliance_status(&entity_type, entity_id)
            .await?
            .map_or_else(|| UNKNOWN_STATUS.to_string(), |s| s.code);
        let violations = self
            .store
            .list_unresolved_violations(&ViolationFilter::for_entity(&entity_type, entity_id))
            .await?;

        let mut by_severity: BTreeMap<String, u64> = self
            .catalog
            .severities()
            .into_iter()
            .map(|s| (s.code, 0))
            .collect();
        for v in &violations {
            *by_severity.entry(v.severity.clone()).or_default() += 1;
        }

        Ok(ComplianceReport {
            entity_type,
            entity_id: entity_id.to_string(),
            status,
            total_violations: violations.len(),
            violations_by_severity: by_severity,
            violations,
            generated_at: Utc::now(),
        })
    }

    /// The rule's severity, or the configured default when the catalog does
    /// not know it.
    async fn violation_severity(&self, rule: &RuleDefinition) -> String {
        if self.catalog.severity(&rule.severity).await.is_some() {
            return rule.severity.clone();
        }
        self.catalog
            .default_severity()
            .await
            .map_or_else(|| rule.severity.clone(), |s| s.code)
    }

    async fn open_status(&self) -> String {
        self.catalog
            .non_compliant_status()
            .await
            .map_or_else(|| STATUS_NON_COMPLIANT.to_string(), |s| s.code)
    }
}

fn default_message(rule: &RuleDefinition) -> String {
    rule.message_or(&rule.rule_name).to_string()
}
