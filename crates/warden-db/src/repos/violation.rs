//! Violation store.
//!
//! A violation is unresolved while it is active and its status is not a
//! resolved catalog status. A status missing from the catalog counts as
//! unresolved. Every unresolved read goes through [`UNRESOLVED_PREDICATE`].

use chrono::{DateTime, Utc};
use tracing::debug;

use warden_core::entities::{NewViolation, Violation};
use warden_core::ids::{PREFIX_VIOLATION, normalize_tag};

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime, parse_optional_datetime, timestamp};
use crate::service::WardenService;

const SELECT_COLS: &str = "v.id, v.rule_id, v.entity_type, v.entity_id, v.severity, v.blocks_operation, \
     v.status, v.violation_message, v.violated_field, v.expected_value, v.actual_value, v.detected_at, \
     v.resolved_at, v.resolved_by, v.resolution_notes, v.active";

const FROM_JOINED: &str =
    "FROM compliance_violations v LEFT JOIN resolution_statuses s ON s.code = v.status";

const UNRESOLVED_PREDICATE: &str = "v.active = 1 AND COALESCE(s.is_resolved, 0) = 0";

/// Detection order; rowid keeps insertion order within one timestamp.
const ORDER_BY: &str = "ORDER BY v.detected_at, v.rowid";

fn row_to_violation(row: &libsql::Row) -> Result<Violation, DatabaseError> {
    Ok(Violation {
        id: row.get(0)?,
        rule_id: get_opt_string(row, 1)?,
        entity_type: row.get(2)?,
        entity_id: row.get(3)?,
        severity: row.get(4)?,
        blocks_operation: get_bool(row, 5)?,
        status: row.get(6)?,
        violation_message: row.get(7)?,
        violated_field: get_opt_string(row, 8)?,
        expected_value: get_opt_string(row, 9)?,
        actual_value: get_opt_string(row, 10)?,
        detected_at: parse_datetime(&row.get::<String>(11)?)?,
        resolved_at: parse_optional_datetime(get_opt_string(row, 12)?.as_deref())?,
        resolved_by: get_opt_string(row, 13)?,
        resolution_notes: get_opt_string(row, 14)?,
        active: get_bool(row, 15)?,
    })
}

/// Narrows the unresolved set. Empty filter means every unresolved violation.
#[derive(Debug, Clone, Default)]
pub struct ViolationFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub severity: Option<String>,
    pub detected_since: Option<DateTime<Utc>>,
}

impl ViolationFilter {
    #[must_use]
    pub fn for_entity(entity_type: &str, entity_id: &str) -> Self {
        Self {
            entity_type: Some(entity_type.to_string()),
            entity_id: Some(entity_id.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_entity_type(entity_type: &str) -> Self {
        Self {
            entity_type: Some(entity_type.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn severity(mut self, severity: &str) -> Self {
        self.severity = Some(severity.to_string());
        self
    }

    #[must_use]
    pub const fn since(mut self, since: DateTime<Utc>) -> Self {
        self.detected_since = Some(since);
        self
    }

    fn where_clause(&self) -> (String, Vec<libsql::Value>) {
        let mut clauses = vec![UNRESOLVED_PREDICATE.to_string()];
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref entity_type) = self.entity_type {
            params.push(normalize_tag(entity_type).into());
            clauses.push(format!("upper(v.entity_type) = ?{}", params.len()));
        }
        if let Some(ref entity_id) = self.entity_id {
            params.push(entity_id.clone().into());
            clauses.push(format!("v.entity_id = ?{}", params.len()));
        }
        if let Some(ref severity) = self.severity {
            params.push(normalize_tag(severity).into());
            clauses.push(format!("upper(v.severity) = ?{}", params.len()));
        }
        if let Some(since) = self.detected_since {
            params.push(timestamp(since).into());
            clauses.push(format!("v.detected_at >= ?{}", params.len()));
        }
        (clauses.join(" AND "), params)
    }
}

impl WardenService {
    /// Persist a violation detected now.
    pub async fn record_violation(&self, new: &NewViolation) -> Result<Violation, DatabaseError> {
        let id = self.db().generate_id(PREFIX_VIOLATION).await?;
        let detected_at = Utc::now();
        let entity_type = normalize_tag(&new.entity_type);

        self.db()
            .conn()
            .execute(
                "INSERT INTO compliance_violations (id, rule_id, entity_type, entity_id, severity, \
                 blocks_operation, status, violation_message, violated_field, expected_value, \
                 actual_value, detected_at, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 1)",
                libsql::params![
                    id.as_str(),
                    new.rule_id.as_deref(),
                    entity_type.as_str(),
                    new.entity_id.as_str(),
                    new.severity.as_str(),
                    i64::from(new.blocks_operation),
                    new.status.as_str(),
                    new.violation_message.as_str(),
                    new.violated_field.as_deref(),
                    new.expected_value.as_deref(),
                    new.actual_value.as_deref(),
                    timestamp(detected_at)
                ],
            )
            .await?;

        debug!(id = %id, entity_type = %entity_type, entity_id = %new.entity_id, "recorded violation");

        Ok(Violation {
            id,
            rule_id: new.rule_id.clone(),
            entity_type,
            entity_id: new.entity_id.clone(),
            severity: new.severity.clone(),
            blocks_operation: new.blocks_operation,
            status: new.status.clone(),
            violation_message: new.violation_message.clone(),
            violated_field: new.violated_field.clone(),
            expected_value: new.expected_value.clone(),
            actual_value: new.actual_value.clone(),
            detected_at,
            resolved_at: None,
            resolved_by: None,
            resolution_notes: None,
            active: true,
        })
    }

    /// # Errors
    ///
    /// `DatabaseError::NotFound` when no violation has this id.
    pub async fn get_violation(&self, id: &str) -> Result<Violation, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM compliance_violations v WHERE v.id = ?1"),
                [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("violation", id))?;
        row_to_violation(&row)
    }

    /// Active violations for one entity, oldest first.
    pub async fn list_violations(
        &self,
        entity_type: &str,
        entity_id: &str,
        unresolved_only: bool,
    ) -> Result<Vec<Violation>, DatabaseError> {
        if unresolved_only {
            return self
                .list_unresolved_violations(&ViolationFilter::for_entity(entity_type, entity_id))
                .await;
        }
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM compliance_violations v
                     WHERE v.active = 1 AND upper(v.entity_type) = ?1 AND v.entity_id = ?2 {ORDER_BY}"
                ),
                libsql::params![normalize_tag(entity_type), entity_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_violation(&row)?);
        }
        Ok(out)
    }

    /// The unresolved set, narrowed by `filter`.
    pub async fn list_unresolved_violations(
        &self,
        filter: &ViolationFilter,
    ) -> Result<Vec<Violation>, DatabaseError> {
        let (where_clause, params) = filter.where_clause();
        let sql = format!("SELECT {SELECT_COLS} {FROM_JOINED} WHERE {where_clause} {ORDER_BY}");
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_violation(&row)?);
        }
        Ok(out)
    }

    /// Move a violation to `status` and stamp resolution metadata.
    ///
    /// Last writer wins: resolving an already resolved violation overwrites
    /// the previous resolution.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NotFound` when no active violation has this id.
    pub async fn resolve_violation(
        &self,
        id: &str,
        status: &str,
        resolved_by: &str,
        notes: Option<&str>,
    ) -> Result<Violation, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE compliance_violations
                 SET status = ?1, resolved_at = ?2, resolved_by = ?3, resolution_notes = ?4
                 WHERE id = ?5 AND active = 1",
                libsql::params![
                    normalize_tag(status),
                    timestamp(Utc::now()),
                    resolved_by,
                    notes,
                    id
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found("violation", id));
        }
        self.get_violation(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{required_rule, seeded_service};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn new_violation(rule_id: Option<&str>, entity_id: &str, severity: &str) -> NewViolation {
        NewViolation {
            rule_id: rule_id.map(String::from),
            entity_type: "asset".into(),
            entity_id: entity_id.into(),
            severity: severity.into(),
            blocks_operation: severity == "CRITICAL",
            status: "NON_COMPLIANT".into(),
            violation_message: "Asset name is required".into(),
            violated_field: Some("assetName".into()),
            expected_value: Some("non-empty value".into()),
            actual_value: None,
        }
    }

    #[tokio::test]
    async fn record_and_get() {
        let svc = seeded_service().await;
        let rule = required_rule(&svc, "R", "ASSET", "assetName", 1).await;
        let recorded = svc
            .record_violation(&new_violation(Some(&rule.id), "42", "CRITICAL"))
            .await
            .unwrap();
        assert!(recorded.id.starts_with("vio-"));
        assert_eq!(recorded.entity_type, "ASSET");

        let fetched = svc.get_violation(&recorded.id).await.unwrap();
        assert_eq!(fetched, recorded);
    }

    #[tokio::test]
    async fn unknown_violation_is_not_found() {
        let svc = seeded_service().await;
        assert!(matches!(
            svc.get_violation("vio-00000000").await,
            Err(DatabaseError::NotFound { kind: "violation", .. })
        ));
        assert!(matches!(
            svc.resolve_violation("vio-00000000", "COMPLIANT", "me", None).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn resolve_removes_from_unresolved_only() {
        let svc = seeded_service().await;
        let v = svc
            .record_violation(&new_violation(None, "42", "HIGH"))
            .await
            .unwrap();
        svc.record_violation(&new_violation(None, "42", "LOW"))
            .await
            .unwrap();

        let resolved = svc
            .resolve_violation(&v.id, "COMPLIANT", "auditor", Some("fixed"))
            .await
            .unwrap();
        assert_eq!(resolved.status, "COMPLIANT");
        assert_eq!(resolved.resolved_by.as_deref(), Some("auditor"));
        assert_eq!(resolved.resolution_notes.as_deref(), Some("fixed"));
        assert!(resolved.resolved_at.is_some());

        let open = svc.list_violations("ASSET", "42", true).await.unwrap();
        assert_eq!(open.len(), 1);
        assert!(open.iter().all(|o| o.id != v.id));
        let all = svc.list_violations("ASSET", "42", false).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn resolve_is_last_writer_wins() {
        let svc = seeded_service().await;
        let v = svc
            .record_violation(&new_violation(None, "1", "HIGH"))
            .await
            .unwrap();
        svc.resolve_violation(&v.id, "COMPLIANT", "a", Some("first"))
            .await
            .unwrap();
        let second = svc
            .resolve_violation(&v.id, "EXEMPTED", "b", Some("second"))
            .await
            .unwrap();
        assert_eq!(second.status, "EXEMPTED");
        assert_eq!(second.resolved_by.as_deref(), Some("b"));
        assert_eq!(second.resolution_notes.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn uncatalogued_status_counts_as_unresolved() {
        let svc = seeded_service().await;
        let v = svc
            .record_violation(&new_violation(None, "1", "HIGH"))
            .await
            .unwrap();
        svc.resolve_violation(&v.id, "ESCALATED", "a", None)
            .await
            .unwrap();
        let open = svc
            .list_unresolved_violations(&ViolationFilter::default())
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].status, "ESCALATED");
    }

    #[tokio::test]
    async fn filter_by_type_and_severity() {
        let svc = seeded_service().await;
        svc.record_violation(&new_violation(None, "1", "HIGH")).await.unwrap();
        svc.record_violation(&new_violation(None, "2", "LOW")).await.unwrap();
        let mut vendor = new_violation(None, "3", "HIGH");
        vendor.entity_type = "VENDOR".into();
        svc.record_violation(&vendor).await.unwrap();

        let high = svc
            .list_unresolved_violations(&ViolationFilter::default().severity("high"))
            .await
            .unwrap();
        assert_eq!(high.len(), 2);
        let asset_high = svc
            .list_unresolved_violations(&ViolationFilter::for_entity_type("asset").severity("HIGH"))
            .await
            .unwrap();
        assert_eq!(asset_high.len(), 1);
        assert_eq!(asset_high[0].entity_id, "1");
    }

    #[tokio::test]
    async fn filter_by_detection_window() {
        let svc = seeded_service().await;
        let v = svc
            .record_violation(&new_violation(None, "1", "HIGH"))
            .await
            .unwrap();
        svc.db()
            .conn()
            .execute(
                "UPDATE compliance_violations SET detected_at = ?1 WHERE id = ?2",
                libsql::params![timestamp(Utc::now() - Duration::days(30)), v.id.as_str()],
            )
            .await
            .unwrap();
        svc.record_violation(&new_violation(None, "2", "HIGH")).await.unwrap();

        let recent = svc
            .list_unresolved_violations(
                &ViolationFilter::default().since(Utc::now() - Duration::days(7)),
            )
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].entity_id, "2");
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let svc = seeded_service().await;
        for severity in ["CRITICAL", "HIGH", "LOW"] {
            svc.record_violation(&new_violation(None, "9", severity))
                .await
                .unwrap();
        }
        let severities: Vec<_> = svc
            .list_violations("ASSET", "9", false)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.severity)
            .collect();
        assert_eq!(severities, ["CRITICAL", "HIGH", "LOW"]);
    }

    #[tokio::test]
    async fn rule_soft_delete_keeps_violation_link() {
        let svc = seeded_service().await;
        let rule = required_rule(&svc, "R", "ASSET", "assetName", 1).await;
        let v = svc
            .record_violation(&new_violation(Some(&rule.id), "1", "CRITICAL"))
            .await
            .unwrap();
        svc.soft_delete_rule(&rule.id, "x").await.unwrap();
        let still = svc.get_violation(&v.id).await.unwrap();
        assert_eq!(still.rule_id.as_deref(), Some(rule.id.as_str()));
        assert_eq!(still.severity, "CRITICAL");
    }
}
