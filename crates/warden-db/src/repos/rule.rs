//! Rule store: create, update, soft delete, lookups.
//!
//! `(rule_code, entity_type)` is unique among active rules. The check runs
//! before any write; the partial unique index catches races and is mapped to
//! the same error.

use chrono::Utc;
use tracing::info;

use warden_core::entities::{RuleDefinition, RuleDraft};
use warden_core::ids::{PREFIX_RULE, normalize_tag};

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_i32, get_opt_string, parse_datetime, timestamp};
use crate::service::WardenService;
use crate::updates::rule::RuleUpdate;

const SELECT_COLS: &str = "id, rule_code, rule_name, description, entity_type, rule_type, severity, \
     rule_expression, error_message, blocks_operation, priority, active, created_by, updated_by, \
     created_at, updated_at";

/// Evaluation order within an entity type.
const ORDER_BY: &str = "ORDER BY priority, created_at, id";

fn row_to_rule(row: &libsql::Row) -> Result<RuleDefinition, DatabaseError> {
    Ok(RuleDefinition {
        id: row.get(0)?,
        rule_code: row.get(1)?,
        rule_name: row.get(2)?,
        description: get_opt_string(row, 3)?,
        entity_type: row.get(4)?,
        rule_type: row.get(5)?,
        severity: row.get(6)?,
        rule_expression: row.get(7)?,
        error_message: get_opt_string(row, 8)?,
        blocks_operation: get_bool(row, 9)?,
        priority: get_i32(row, 10)?,
        active: get_bool(row, 11)?,
        created_by: get_opt_string(row, 12)?,
        updated_by: get_opt_string(row, 13)?,
        created_at: parse_datetime(&row.get::<String>(14)?)?,
        updated_at: parse_datetime(&row.get::<String>(15)?)?,
    })
}

fn require(field: &str, value: &str) -> Result<(), DatabaseError> {
    if value.trim().is_empty() {
        return Err(DatabaseError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn map_unique(err: libsql::Error, rule_code: &str, entity_type: &str) -> DatabaseError {
    if DatabaseError::is_unique_violation(&err) {
        DatabaseError::DuplicateRule {
            rule_code: rule_code.to_string(),
            entity_type: entity_type.to_string(),
        }
    } else {
        DatabaseError::LibSql(err)
    }
}

impl WardenService {
    /// Persist a new rule.
    ///
    /// When the draft leaves `blocks_operation` unset, the severity's catalog
    /// default applies (non-blocking if the severity is unknown).
    ///
    /// # Errors
    ///
    /// `DatabaseError::Validation` for blank required fields,
    /// `DatabaseError::DuplicateRule` when the code is taken for the entity type.
    pub async fn create_rule(
        &self,
        draft: &RuleDraft,
        actor: &str,
    ) -> Result<RuleDefinition, DatabaseError> {
        let rule_code = normalize_tag(&draft.rule_code);
        let entity_type = normalize_tag(&draft.entity_type);
        let rule_type = normalize_tag(&draft.rule_type);
        let severity = normalize_tag(&draft.severity);
        require("rule_code", &rule_code)?;
        require("rule_name", &draft.rule_name)?;
        require("entity_type", &entity_type)?;
        require("rule_type", &rule_type)?;
        require("severity", &severity)?;

        if self.find_rule_by_code(&rule_code, &entity_type).await?.is_some() {
            return Err(DatabaseError::DuplicateRule {
                rule_code,
                entity_type,
            });
        }

        let blocks_operation = match draft.blocks_operation {
            Some(blocks) => blocks,
            None => self
                .find_severity(&severity)
                .await?
                .is_some_and(|s| s.blocks_operation),
        };

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_RULE).await?;
        self.db()
            .conn()
            .execute(
                "INSERT INTO compliance_rules (id, rule_code, rule_name, description, entity_type, rule_type, \
                 severity, rule_expression, error_message, blocks_operation, priority, active, created_by, \
                 updated_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1, ?12, ?12, ?13, ?13)",
                libsql::params![
                    id.as_str(),
                    rule_code.as_str(),
                    draft.rule_name.as_str(),
                    draft.description.as_deref(),
                    entity_type.as_str(),
                    rule_type.as_str(),
                    severity.as_str(),
                    draft.rule_expression.as_str(),
                    draft.error_message.as_deref(),
                    i64::from(blocks_operation),
                    i64::from(draft.priority),
                    actor,
                    timestamp(now)
                ],
            )
            .await
            .map_err(|e| map_unique(e, &rule_code, &entity_type))?;

        info!(id = %id, rule_code = %rule_code, entity_type = %entity_type, "created rule");
        self.get_rule(&id).await
    }

    /// Fetch a rule by id, active or not.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NotFound` when no rule has this id.
    pub async fn get_rule(&self, id: &str) -> Result<RuleDefinition, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM compliance_rules WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("rule", id))?;
        row_to_rule(&row)
    }

    /// The active rule with this code for the entity type, if any.
    pub async fn find_rule_by_code(
        &self,
        rule_code: &str,
        entity_type: &str,
    ) -> Result<Option<RuleDefinition>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM compliance_rules
                     WHERE upper(rule_code) = ?1 AND upper(entity_type) = ?2 AND active = 1"
                ),
                libsql::params![normalize_tag(rule_code), normalize_tag(entity_type)],
            )
            .await?;
        rows.next().await?.map(|row| row_to_rule(&row)).transpose()
    }

    /// Active rules for one entity type in evaluation order.
    pub async fn list_rules_by_entity_type(
        &self,
        entity_type: &str,
    ) -> Result<Vec<RuleDefinition>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM compliance_rules
                     WHERE upper(entity_type) = ?1 AND active = 1 {ORDER_BY}"
                ),
                [normalize_tag(entity_type)],
            )
            .await?;
        let mut rules = Vec::new();
        while let Some(row) = rows.next().await? {
            rules.push(row_to_rule(&row)?);
        }
        Ok(rules)
    }

    /// All active rules, grouped by entity type, each group in evaluation order.
    pub async fn list_rules(&self) -> Result<Vec<RuleDefinition>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM compliance_rules WHERE active = 1 \
                     ORDER BY entity_type, priority, created_at, id"
                ),
                (),
            )
            .await?;
        let mut rules = Vec::new();
        while let Some(row) = rows.next().await? {
            rules.push(row_to_rule(&row)?);
        }
        Ok(rules)
    }

    /// Apply a partial update to an active rule.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NotFound` for unknown or soft-deleted rules,
    /// `DatabaseError::DuplicateRule` when the new code/entity type pair collides
    /// with another active rule, `DatabaseError::Validation` for blank values.
    pub async fn update_rule(
        &self,
        rule_id: &str,
        update: &RuleUpdate,
        actor: &str,
    ) -> Result<RuleDefinition, DatabaseError> {
        let current = self.get_rule(rule_id).await?;
        if !current.active {
            return Err(DatabaseError::not_found("rule", rule_id));
        }
        if update.is_empty() {
            return Ok(current);
        }

        let new_code = update
            .rule_code
            .as_deref()
            .map_or_else(|| current.rule_code.clone(), normalize_tag);
        let new_entity = update
            .entity_type
            .as_deref()
            .map_or_else(|| current.entity_type.clone(), normalize_tag);
        require("rule_code", &new_code)?;
        require("entity_type", &new_entity)?;

        if update.rule_code.is_some() || update.entity_type.is_some() {
            let clash = self.find_rule_by_code(&new_code, &new_entity).await?;
            if clash.is_some_and(|other| other.id != current.id) {
                return Err(DatabaseError::DuplicateRule {
                    rule_code: new_code,
                    entity_type: new_entity,
                });
            }
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if update.rule_code.is_some() {
            sets.push(format!("rule_code = ?{idx}"));
            params.push(new_code.clone().into());
            idx += 1;
        }
        if let Some(ref name) = update.rule_name {
            require("rule_name", name)?;
            sets.push(format!("rule_name = ?{idx}"));
            params.push(name.clone().into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(description.clone().map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if update.entity_type.is_some() {
            sets.push(format!("entity_type = ?{idx}"));
            params.push(new_entity.clone().into());
            idx += 1;
        }
        if let Some(ref rule_type) = update.rule_type {
            let rule_type = normalize_tag(rule_type);
            require("rule_type", &rule_type)?;
            sets.push(format!("rule_type = ?{idx}"));
            params.push(rule_type.into());
            idx += 1;
        }
        if let Some(ref severity) = update.severity {
            let severity = normalize_tag(severity);
            require("severity", &severity)?;
            sets.push(format!("severity = ?{idx}"));
            params.push(severity.into());
            idx += 1;
        }
        if let Some(ref expression) = update.rule_expression {
            sets.push(format!("rule_expression = ?{idx}"));
            params.push(expression.clone().into());
            idx += 1;
        }
        if let Some(ref message) = update.error_message {
            sets.push(format!("error_message = ?{idx}"));
            params.push(message.clone().map_or(libsql::Value::Null, Into::into));
            idx += 1;
        }
        if let Some(blocks) = update.blocks_operation {
            sets.push(format!("blocks_operation = ?{idx}"));
            params.push(i64::from(blocks).into());
            idx += 1;
        }
        if let Some(priority) = update.priority {
            sets.push(format!("priority = ?{idx}"));
            params.push(i64::from(priority).into());
            idx += 1;
        }

        sets.push(format!("updated_by = ?{idx}"));
        params.push(actor.into());
        idx += 1;
        sets.push(format!("updated_at = ?{idx}"));
        params.push(timestamp(Utc::now()).into());
        idx += 1;

        params.push(rule_id.into());
        let sql = format!(
            "UPDATE compliance_rules SET {} WHERE id = ?{idx} AND active = 1",
            sets.join(", ")
        );
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| map_unique(e, &new_code, &new_entity))?;

        info!(id = %rule_id, "updated rule");
        self.get_rule(rule_id).await
    }

    /// Deactivate a rule. Existing violations keep their reference.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NotFound` for unknown or already deleted rules.
    pub async fn soft_delete_rule(&self, rule_id: &str, actor: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE compliance_rules SET active = 0, updated_by = ?1, updated_at = ?2
                 WHERE id = ?3 AND active = 1",
                libsql::params![actor, timestamp(Utc::now()), rule_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found("rule", rule_id));
        }
        info!(id = %rule_id, "deactivated rule");
        Ok(())
    }
}
