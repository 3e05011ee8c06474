//! Catalog repository: rule types, severities, resolution statuses.
//!
//! Codes are stored upper-case, so lookups normalize the requested code and
//! compare exactly.

use warden_core::entities::{CatalogEntry, ResolutionStatus, RuleType, Severity};
use warden_core::enums::CatalogKind;
use warden_core::ids::normalize_tag;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string};
use crate::service::WardenService;

const RULE_TYPE_COLS: &str = "code, name, description, category, display_order, active";
const SEVERITY_COLS: &str = "code, name, description, level, blocks_operation, active";
const STATUS_COLS: &str = "code, name, description, is_resolved, active";

fn row_to_rule_type(row: &libsql::Row) -> Result<RuleType, DatabaseError> {
    Ok(RuleType {
        code: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        category: row.get(3)?,
        display_order: row.get(4)?,
        active: get_bool(row, 5)?,
    })
}

fn row_to_severity(row: &libsql::Row) -> Result<Severity, DatabaseError> {
    Ok(Severity {
        code: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        level: row.get(3)?,
        blocks_operation: get_bool(row, 4)?,
        active: get_bool(row, 5)?,
    })
}

fn row_to_status(row: &libsql::Row) -> Result<ResolutionStatus, DatabaseError> {
    Ok(ResolutionStatus {
        code: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        is_resolved: get_bool(row, 3)?,
        active: get_bool(row, 4)?,
    })
}

impl WardenService {
    /// Active rule types by display order.
    pub async fn load_rule_types(&self) -> Result<Vec<RuleType>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {RULE_TYPE_COLS} FROM rule_types WHERE active = 1 ORDER BY display_order, code"
                ),
                (),
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_rule_type(&row)?);
        }
        Ok(out)
    }

    /// Active severities, most severe first.
    pub async fn load_severities(&self) -> Result<Vec<Severity>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SEVERITY_COLS} FROM severities WHERE active = 1 ORDER BY level, code"),
                (),
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_severity(&row)?);
        }
        Ok(out)
    }

    /// Active resolution statuses, unresolved ones first.
    pub async fn load_resolution_statuses(&self) -> Result<Vec<ResolutionStatus>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {STATUS_COLS} FROM resolution_statuses WHERE active = 1 ORDER BY is_resolved, code"
                ),
                (),
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_status(&row)?);
        }
        Ok(out)
    }

    pub async fn find_rule_type(&self, code: &str) -> Result<Option<RuleType>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {RULE_TYPE_COLS} FROM rule_types WHERE code = ?1 AND active = 1"),
                [normalize_tag(code)],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_rule_type(&row))
            .transpose()
    }

    pub async fn find_severity(&self, code: &str) -> Result<Option<Severity>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SEVERITY_COLS} FROM severities WHERE code = ?1 AND active = 1"),
                [normalize_tag(code)],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_severity(&row))
            .transpose()
    }

    pub async fn find_resolution_status(
        &self,
        code: &str,
    ) -> Result<Option<ResolutionStatus>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {STATUS_COLS} FROM resolution_statuses WHERE code = ?1 AND active = 1"),
                [normalize_tag(code)],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_status(&row))
            .transpose()
    }

    /// All active entries of one kind, in that kind's natural order.
    pub async fn load_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, DatabaseError> {
        Ok(match kind {
            CatalogKind::RuleType => self
                .load_rule_types()
                .await?
                .into_iter()
                .map(CatalogEntry::from)
                .collect(),
            CatalogKind::Severity => self
                .load_severities()
                .await?
                .into_iter()
                .map(CatalogEntry::from)
                .collect(),
            CatalogKind::ResolutionStatus => self
                .load_resolution_statuses()
                .await?
                .into_iter()
                .map(CatalogEntry::from)
                .collect(),
        })
    }

    /// One active entry by kind and code (case-insensitive).
    pub async fn find_catalog_entry(
        &self,
        kind: CatalogKind,
        code: &str,
    ) -> Result<Option<CatalogEntry>, DatabaseError> {
        Ok(match kind {
            CatalogKind::RuleType => self.find_rule_type(code).await?.map(CatalogEntry::from),
            CatalogKind::Severity => self.find_severity(code).await?.map(CatalogEntry::from),
            CatalogKind::ResolutionStatus => self
                .find_resolution_status(code)
                .await?
                .map(CatalogEntry::from),
        })
    }
}
