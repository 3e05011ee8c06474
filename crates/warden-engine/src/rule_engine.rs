//! Validation rule engine.
//!
//! One evaluator per [`RuleKind`], dispatched on the rule's type code. Rule
//! types without an evaluator pass. Evaluators read fields generically
//! through [`EntityRecord`]; null values pass every kind except
//! `REQUIRED_FIELD`.
//!
//! [`RuleEngine::evaluate`] returns `Err` when the rule itself is broken
//! (malformed document, unknown field, bad pattern, missing source).
//! [`RuleEngine::validate`] folds those errors into a failed result so a
//! broken rule is reported rather than skipped.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use tracing::{debug, warn};
use warden_core::entities::{RuleDefinition, ValidationResult};
use warden_core::enums::RuleKind;
use warden_core::expression::{
    DEFAULT_DATE_FORMAT, DateExpression, ExpiryExpression, ExpressionDocument, FieldExpression,
    FormatExpression, LengthExpression, RangeExpression, ReferenceExpression,
};
use warden_core::field::FieldValue;

use crate::dates::parse_date;
use crate::error::EngineError;
use crate::records::EntityRecord;
use crate::registry::EntityRegistry;

/// Evaluates single rules against single records.
pub struct RuleEngine {
    registry: EntityRegistry,
    patterns: Mutex<HashMap<String, Regex>>,
}

impl RuleEngine {
    #[must_use]
    pub fn new(registry: EntityRegistry) -> Self {
        Self {
            registry,
            patterns: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Evaluate `rule` against `record`, failing closed on rule errors.
    pub async fn validate(
        &self,
        rule: &RuleDefinition,
        entity_type: &str,
        entity_id: &str,
        record: &dyn EntityRecord,
    ) -> ValidationResult {
        match self.evaluate(rule, entity_type, entity_id, record).await {
            Ok(result) => {
                debug!(rule = %rule.rule_code, entity_id, valid = result.valid, "rule evaluated");
                result
            }
            Err(e) => {
                warn!(rule = %rule.rule_code, entity_id, error = %e, "rule could not be evaluated");
                let result = ValidationResult::fail(e.to_string());
                match e {
                    EngineError::UnknownField { field, .. }
                    | EngineError::NoUniquenessCheck { field, .. } => result.field(field),
                    _ => result,
                }
            }
        }
    }

    /// Evaluate `rule` against `record`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` when the rule cannot be evaluated as configured.
    pub async fn evaluate(
        &self,
        rule: &RuleDefinition,
        entity_type: &str,
        entity_id: &str,
        record: &dyn EntityRecord,
    ) -> Result<ValidationResult, EngineError> {
        let Some(kind) = RuleKind::from_code(&rule.rule_type) else {
            warn!(rule = %rule.rule_code, rule_type = %rule.rule_type, "no evaluator for rule type, passing");
            return Ok(ValidationResult::pass());
        };
        let doc = rule.rule_expression.as_str();
        match kind {
            RuleKind::RequiredField => {
                let expr: FieldExpression = parse(rule, doc)?;
                let value = read_field(record, entity_type, &expr.field)?;
                if !value.is_missing() {
                    return Ok(ValidationResult::pass());
                }
                let fallback = format!("Field '{}' is required", expr.field);
                Ok(ValidationResult::fail(rule.message_or(&fallback)).field(expr.field))
            }
            RuleKind::UniqueField => {
                let expr: FieldExpression = parse(rule, doc)?;
                self.unique(rule, entity_type, entity_id, record, expr).await
            }
            RuleKind::FormatValidation => {
                let expr: FormatExpression = parse(rule, doc)?;
                self.format(rule, entity_type, record, expr)
            }
            RuleKind::RangeValidation => {
                let expr: RangeExpression = parse(rule, doc)?;
                range(rule, entity_type, record, &expr)
            }
            RuleKind::LengthValidation => {
                let expr: LengthExpression = parse(rule, doc)?;
                length(rule, entity_type, record, &expr)
            }
            RuleKind::ReferenceIntegrity => {
                let expr: ReferenceExpression = parse(rule, doc)?;
                self.reference(entity_type, record, expr).await
            }
            RuleKind::DateValidation => {
                let expr: DateExpression = parse(rule, doc)?;
                date_window(rule, entity_type, record, &expr)
            }
            RuleKind::WarrantyExpiry => {
                let expr: ExpiryExpression = parse(rule, doc)?;
                expiry(rule, entity_type, record, &expr, "Warranty has expired")
            }
            RuleKind::AmcRenewal => {
                let expr: ExpiryExpression = parse(rule, doc)?;
                expiry(rule, entity_type, record, &expr, "AMC has expired and needs renewal")
            }
        }
    }

    async fn unique(
        &self,
        rule: &RuleDefinition,
        entity_type: &str,
        entity_id: &str,
        record: &dyn EntityRecord,
        expr: FieldExpression,
    ) -> Result<ValidationResult, EngineError> {
        let value = read_field(record, entity_type, &expr.field)?;
        if value.is_null() {
            return Ok(ValidationResult::pass());
        }
        let source = self
            .registry
            .get(entity_type)
            .ok_or_else(|| EngineError::UnknownEntityType(entity_type.to_string()))?;
        let exclude = Some(entity_id).filter(|id| !id.trim().is_empty());
        let taken = source
            .value_taken(&expr.field, &value, exclude)
            .await?
            .ok_or_else(|| EngineError::NoUniquenessCheck {
                entity_type: entity_type.to_string(),
                field: expr.field.clone(),
            })?;
        if !taken {
            return Ok(ValidationResult::pass());
        }
        let fallback = format!("Field '{}' must be unique", expr.field);
        Ok(ValidationResult::fail(rule.message_or(&fallback))
            .field(expr.field)
            .actual(value.render()))
    }

    fn format(
        &self,
        rule: &RuleDefinition,
        entity_type: &str,
        record: &dyn EntityRecord,
        expr: FormatExpression,
    ) -> Result<ValidationResult, EngineError> {
        let value = read_field(record, entity_type, &expr.field)?;
        let Some(text) = value.render() else {
            return Ok(ValidationResult::pass());
        };
        if self.pattern(&expr.pattern)?.is_match(&text) {
            return Ok(ValidationResult::pass());
        }
        let fallback = format!("Field '{}' does not match required format", expr.field);
        Ok(ValidationResult::fail(rule.message_or(&fallback))
            .field(expr.field)
            .expected(format!("Pattern: {}", expr.pattern))
            .actual(Some(text)))
    }

    async fn reference(
        &self,
        entity_type: &str,
        record: &dyn EntityRecord,
        expr: ReferenceExpression,
    ) -> Result<ValidationResult, EngineError> {
        let value = read_field(record, entity_type, &expr.field)?;
        if value.is_missing() {
            return Ok(ValidationResult::pass());
        }
        let Some(target_id) = value.as_reference() else {
            return Ok(ValidationResult::fail(format!(
                "Field '{}' is not a valid {} reference",
                expr.field, expr.referenced_entity_type
            ))
            .field(expr.field)
            .expected(format!("{} ID", expr.referenced_entity_type))
            .actual(value.render()));
        };
        let source = self
            .registry
            .get(&expr.referenced_entity_type)
            .ok_or_else(|| EngineError::UnknownEntityType(expr.referenced_entity_type.clone()))?;
        if source.exists_by_id(&target_id).await? {
            return Ok(ValidationResult::pass());
        }
        Ok(ValidationResult::fail(format!(
            "Referenced {} with ID {target_id} does not exist",
            expr.referenced_entity_type
        ))
        .field(expr.field)
        .expected(format!("Existing {}", expr.referenced_entity_type))
        .actual(Some(target_id)))
    }

    /// Compiled full-match regex for `pattern`, cached by pattern text.
    fn pattern(&self, pattern: &str) -> Result<Regex, EngineError> {
        let mut cache = self
            .patterns
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(re) = cache.get(pattern) {
            return Ok(re.clone());
        }
        let re = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            EngineError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;
        cache.insert(pattern.to_string(), re.clone());
        Ok(re)
    }
}

fn parse<T: ExpressionDocument>(rule: &RuleDefinition, document: &str) -> Result<T, EngineError> {
    T::parse(document).map_err(|reason| EngineError::MalformedExpression {
        rule_code: rule.rule_code.clone(),
        reason,
    })
}

fn read_field(
    record: &dyn EntityRecord,
    entity_type: &str,
    field: &str,
) -> Result<FieldValue, EngineError> {
    record.field(field).ok_or_else(|| EngineError::UnknownField {
        entity_type: entity_type.to_string(),
        field: field.to_string(),
    })
}

fn bound<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "unbounded".to_string(), |v| v.to_string())
}

fn range(
    rule: &RuleDefinition,
    entity_type: &str,
    record: &dyn EntityRecord,
    expr: &RangeExpression,
) -> Result<ValidationResult, EngineError> {
    let value = read_field(record, entity_type, &expr.field)?;
    if value.is_null() {
        return Ok(ValidationResult::pass());
    }
    let expected = format!("Range: {} to {}", bound(expr.min), bound(expr.max));
    let n = match value.as_f64() {
        Ok(n) => n,
        Err(reason) => {
            return Ok(ValidationResult::fail(format!(
                "Field '{}' is not numeric: {reason}",
                expr.field
            ))
            .field(expr.field.clone())
            .expected(expected)
            .actual(value.render()));
        }
    };
    let below = expr.min.is_some_and(|min| n < min);
    let above = expr.max.is_some_and(|max| n > max);
    if !below && !above {
        return Ok(ValidationResult::pass());
    }
    let fallback = format!("Field '{}' is out of range", expr.field);
    Ok(ValidationResult::fail(rule.message_or(&fallback))
        .field(expr.field.clone())
        .expected(expected)
        .actual(Some(n.to_string())))
}

fn length(
    rule: &RuleDefinition,
    entity_type: &str,
    record: &dyn EntityRecord,
    expr: &LengthExpression,
) -> Result<ValidationResult, EngineError> {
    let value = read_field(record, entity_type, &expr.field)?;
    let Some(text) = value.render() else {
        return Ok(ValidationResult::pass());
    };
    let len = text.chars().count();
    let short = expr.min_length.is_some_and(|min| len < min);
    let long = expr.max_length.is_some_and(|max| len > max);
    if !short && !long {
        return Ok(ValidationResult::pass());
    }
    let fallback = format!("Field '{}' has invalid length", expr.field);
    Ok(ValidationResult::fail(rule.message_or(&fallback))
        .field(expr.field.clone())
        .expected(format!(
            "Length range: {} to {}",
            bound(expr.min_length),
            bound(expr.max_length)
        ))
        .actual(Some(format!("Length: {len}"))))
}

fn date_window(
    rule: &RuleDefinition,
    entity_type: &str,
    record: &dyn EntityRecord,
    expr: &DateExpression,
) -> Result<ValidationResult, EngineError> {
    let value = read_field(record, entity_type, &expr.field)?;
    if value.is_null() {
        return Ok(ValidationResult::pass());
    }
    let date = value.as_date().or_else(|| match &value {
        FieldValue::Text(s) => parse_date(s, &expr.format),
        _ => None,
    });
    let Some(date) = date else {
        return Ok(ValidationResult::fail(format!(
            "Invalid date format. Expected: {}",
            expr.format
        ))
        .field(expr.field.clone())
        .expected(expr.format.clone())
        .actual(value.render()));
    };
    let early = expr.min_date.is_some_and(|min| date < min);
    let late = expr.max_date.is_some_and(|max| date > max);
    if !early && !late {
        return Ok(ValidationResult::pass());
    }
    let fallback = format!("Field '{}' is outside the allowed date range", expr.field);
    Ok(ValidationResult::fail(rule.message_or(&fallback))
        .field(expr.field.clone())
        .expected(format!(
            "Date range: {} to {}",
            bound(expr.min_date),
            bound(expr.max_date)
        ))
        .actual(Some(date.to_string())))
}

fn expiry(
    rule: &RuleDefinition,
    entity_type: &str,
    record: &dyn EntityRecord,
    expr: &ExpiryExpression,
    default_message: &str,
) -> Result<ValidationResult, EngineError> {
    let field = expr.field_name();
    let value = read_field(record, entity_type, field)?;
    let now = Utc::now();
    let expired = match &value {
        FieldValue::Null => return Ok(ValidationResult::pass()),
        FieldValue::DateTime(end) => *end < now,
        FieldValue::Date(end) => *end < now.date_naive(),
        FieldValue::Text(s) => match parse_end(s) {
            Some(end) => end < now.date_naive(),
            None => {
                return Ok(ValidationResult::fail(format!(
                    "Invalid date format. Expected: {DEFAULT_DATE_FORMAT}"
                ))
                .field(field)
                .actual(value.render()));
            }
        },
        other => {
            return Ok(ValidationResult::fail(format!(
                "Field '{field}' is not a date"
            ))
            .field(field)
            .actual(other.render()));
        }
    };
    if !expired {
        return Ok(ValidationResult::pass());
    }
    Ok(ValidationResult::fail(rule.message_or(default_message))
        .field(field)
        .expected(format!("On or after {}", now.date_naive()))
        .actual(value.render()))
}

fn parse_end(s: &str) -> Option<NaiveDate> {
    parse_date(s, DEFAULT_DATE_FORMAT).or_else(|| {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::JsonRecord;
    use crate::registry::InMemorySource;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn rule(rule_type: &str, expression: &str) -> RuleDefinition {
        RuleDefinition {
            id: "rul-00000001".into(),
            rule_code: "TEST_RULE".into(),
            rule_name: "Test rule".into(),
            description: None,
            entity_type: "ASSET".into(),
            rule_type: rule_type.into(),
            severity: "MEDIUM".into(),
            rule_expression: expression.into(),
            error_message: None,
            blocks_operation: false,
            priority: 100,
            active: true,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn record(value: Value) -> JsonRecord {
        JsonRecord::from_value(value).unwrap()
    }

    fn engine() -> RuleEngine {
        let assets = InMemorySource::new([
            record(json!({"id": "1", "assetName": "Laptop"})),
            record(json!({"id": "2", "assetName": "Printer"})),
        ])
        .unique_on(&["assetName"]);
        let vendors = InMemorySource::new([record(json!({"id": 10, "vendorName": "Acme"}))]);
        RuleEngine::new(
            EntityRegistry::new()
                .with("ASSET", Arc::new(assets))
                .with("VENDOR", Arc::new(vendors)),
        )
    }

    async fn check(rule_type: &str, expression: &str, entity: Value) -> ValidationResult {
        let entity = record(entity);
        let id = entity.id().unwrap_or_default();
        engine()
            .validate(&rule(rule_type, expression), "ASSET", &id, &entity)
            .await
    }

    #[rstest]
    #[case(json!({"assetName": "Laptop"}), true)]
    #[case(json!({"assetName": null}), false)]
    #[case(json!({"assetName": "   "}), false)]
    #[case(json!({"assetName": 0}), true)]
    #[tokio::test]
    async fn required_field(#[case] entity: Value, #[case] valid: bool) {
        let result = check("REQUIRED_FIELD", r#"{"field":"assetName"}"#, entity).await;
        assert_eq!(result.valid, valid);
        if !valid {
            assert_eq!(result.field.as_deref(), Some("assetName"));
            assert_eq!(result.message.as_deref(), Some("Field 'assetName' is required"));
        }
    }

    #[tokio::test]
    async fn rule_message_overrides_default() {
        let mut r = rule("REQUIRED_FIELD", r#"{"field":"assetName"}"#);
        r.error_message = Some("Asset name is required".into());
        let entity = record(json!({"id": "9", "assetName": null}));
        let result = engine().validate(&r, "ASSET", "9", &entity).await;
        assert_eq!(result.message.as_deref(), Some("Asset name is required"));
    }

    #[rstest]
    #[case(json!({"id": "9", "assetName": "laptop "}), false)]
    #[case(json!({"id": "1", "assetName": "Laptop"}), true)]
    #[case(json!({"id": "9", "assetName": "Scanner"}), true)]
    #[case(json!({"id": "9", "assetName": null}), true)]
    #[tokio::test]
    async fn unique_field(#[case] entity: Value, #[case] valid: bool) {
        let result = check("UNIQUE_FIELD", r#"{"field":"assetName"}"#, entity).await;
        assert_eq!(result.valid, valid, "{result:?}");
    }

    #[tokio::test]
    async fn unique_without_check_fails_closed() {
        let entity = record(json!({"id": "9", "serial": "S1"}));
        let result = engine()
            .validate(&rule("UNIQUE_FIELD", r#"{"field":"serial"}"#), "ASSET", "9", &entity)
            .await;
        assert!(!result.valid);
        assert_eq!(result.field.as_deref(), Some("serial"));
        assert!(result.message.unwrap().contains("No uniqueness check"));
    }

    #[rstest]
    #[case("a@b.com", true)]
    #[case("not-an-email", false)]
    #[case("x@y.org trailing", true)]
    #[tokio::test]
    async fn email_format(#[case] email: &str, #[case] valid: bool) {
        let result = check(
            "FORMAT_VALIDATION",
            r#"{"field":"email","pattern":"^[A-Za-z0-9+_.-]+@(.+)$"}"#,
            json!({"email": email}),
        )
        .await;
        assert_eq!(result.valid, valid);
        if !valid {
            assert_eq!(result.actual.as_deref(), Some(email));
            assert_eq!(
                result.expected.as_deref(),
                Some("Pattern: ^[A-Za-z0-9+_.-]+@(.+)$")
            );
        }
    }

    #[tokio::test]
    async fn format_requires_full_match() {
        let result = check(
            "FORMAT_VALIDATION",
            r#"{"field":"phone","pattern":"[0-9]{10}"}"#,
            json!({"phone": "12345678901"}),
        )
        .await;
        assert!(!result.valid);
        let result = check(
            "FORMAT_VALIDATION",
            r#"{"field":"phone","pattern":"[0-9]{10}"}"#,
            json!({"phone": 1_234_567_890_i64}),
        )
        .await;
        assert!(result.valid);
    }

    #[tokio::test]
    async fn invalid_pattern_fails_closed() {
        let result = check(
            "FORMAT_VALIDATION",
            r#"{"field":"email","pattern":"(unclosed"}"#,
            json!({"email": "a@b.com"}),
        )
        .await;
        assert!(!result.valid);
        assert!(result.message.unwrap().starts_with("Invalid pattern"));
    }

    #[rstest]
    #[case(json!({"cost": 50}), true)]
    #[case(json!({"cost": "10"}), true)]
    #[case(json!({"cost": 5.5}), false)]
    #[case(json!({"cost": 1000}), false)]
    #[case(json!({"cost": null}), true)]
    #[case(json!({"cost": "lots"}), false)]
    #[tokio::test]
    async fn range_bounds(#[case] entity: Value, #[case] valid: bool) {
        let result = check("RANGE_VALIDATION", r#"{"field":"cost","min":10,"max":"500"}"#, entity)
            .await;
        assert_eq!(result.valid, valid, "{result:?}");
        if !valid {
            assert_eq!(result.expected.as_deref(), Some("Range: 10 to 500"));
        }
    }

    #[tokio::test]
    async fn open_ended_range() {
        let result = check("RANGE_VALIDATION", r#"{"field":"cost","min":0}"#, json!({"cost": -1}))
            .await;
        assert!(!result.valid);
        assert_eq!(result.expected.as_deref(), Some("Range: 0 to unbounded"));
    }

    #[rstest]
    #[case("ab", false)]
    #[case("abc", true)]
    #[case("ñandú", true)]
    #[case("abcdefghijk", false)]
    #[tokio::test]
    async fn length_bounds(#[case] name: &str, #[case] valid: bool) {
        let result = check(
            "LENGTH_VALIDATION",
            r#"{"field":"assetName","minLength":3,"maxLength":10}"#,
            json!({"assetName": name}),
        )
        .await;
        assert_eq!(result.valid, valid);
        if !valid {
            assert_eq!(result.expected.as_deref(), Some("Length range: 3 to 10"));
            assert_eq!(
                result.actual,
                Some(format!("Length: {}", name.chars().count()))
            );
        }
    }

    #[tokio::test]
    async fn reference_integrity() {
        let expr = r#"{"field":"vendorId","referencedEntityType":"VENDOR"}"#;
        assert!(check("REFERENCE_INTEGRITY", expr, json!({"vendorId": 10})).await.valid);
        assert!(
            check("REFERENCE_INTEGRITY", expr, json!({"vendorId": {"id": 10}}))
                .await
                .valid
        );
        assert!(check("REFERENCE_INTEGRITY", expr, json!({"vendorId": null})).await.valid);

        let missing = check("REFERENCE_INTEGRITY", expr, json!({"vendorId": 11})).await;
        assert!(!missing.valid);
        assert_eq!(
            missing.message.as_deref(),
            Some("Referenced VENDOR with ID 11 does not exist")
        );
        assert_eq!(missing.actual.as_deref(), Some("11"));
    }

    #[rstest]
    #[case(json!({"vendorId": 10.5}), "10.5")]
    #[case(json!({"vendorId": true}), "true")]
    #[tokio::test]
    async fn reference_rejects_non_identifier_values(#[case] entity: Value, #[case] actual: &str) {
        let expr = r#"{"field":"vendorId","referencedEntityType":"VENDOR"}"#;
        let result = check("REFERENCE_INTEGRITY", expr, entity).await;
        assert!(!result.valid);
        assert_eq!(
            result.message.as_deref(),
            Some("Field 'vendorId' is not a valid VENDOR reference")
        );
        assert_eq!(result.field.as_deref(), Some("vendorId"));
        assert_eq!(result.actual.as_deref(), Some(actual));
    }

    #[tokio::test]
    async fn reference_to_unregistered_type_fails_closed() {
        let expr = r#"{"field":"outletId","referencedEntityType":"OUTLET"}"#;
        let result = check("REFERENCE_INTEGRITY", expr, json!({"outletId": 1})).await;
        assert!(!result.valid);
        assert_eq!(
            result.message.as_deref(),
            Some("No entity source registered for OUTLET")
        );
    }

    #[rstest]
    #[case(json!({"purchaseDate": "2024-06-01"}), true)]
    #[case(json!({"purchaseDate": "2019-12-31"}), false)]
    #[case(json!({"purchaseDate": "2031-01-01"}), false)]
    #[case(json!({"purchaseDate": null}), true)]
    #[tokio::test]
    async fn date_window_bounds(#[case] entity: Value, #[case] valid: bool) {
        let result = check(
            "DATE_VALIDATION",
            r#"{"field":"purchaseDate","format":"yyyy-MM-dd","minDate":"2020-01-01","maxDate":"2030-12-31"}"#,
            entity,
        )
        .await;
        assert_eq!(result.valid, valid);
    }

    #[tokio::test]
    async fn unparseable_date_is_a_violation() {
        let result = check(
            "DATE_VALIDATION",
            r#"{"field":"purchaseDate","format":"dd/MM/yyyy"}"#,
            json!({"purchaseDate": "2024-06-01"}),
        )
        .await;
        assert!(!result.valid);
        assert_eq!(
            result.message.as_deref(),
            Some("Invalid date format. Expected: dd/MM/yyyy")
        );
    }

    #[tokio::test]
    async fn warranty_and_amc_expiry() {
        let yesterday = (Utc::now() - Duration::days(1)).date_naive().to_string();
        let tomorrow = (Utc::now() + Duration::days(1)).date_naive().to_string();

        let expired = check("WARRANTY_EXPIRY", "{}", json!({"endDate": yesterday})).await;
        assert!(!expired.valid);
        assert_eq!(expired.message.as_deref(), Some("Warranty has expired"));
        assert_eq!(expired.field.as_deref(), Some("endDate"));

        assert!(check("WARRANTY_EXPIRY", "", json!({"endDate": tomorrow})).await.valid);
        assert!(check("WARRANTY_EXPIRY", "{}", json!({"endDate": null})).await.valid);

        let amc = check(
            "AMC_RENEWAL",
            r#"{"field":"contractEnd"}"#,
            json!({"contractEnd": yesterday}),
        )
        .await;
        assert_eq!(amc.message.as_deref(), Some("AMC has expired and needs renewal"));
    }

    #[tokio::test]
    async fn unknown_rule_type_passes() {
        for code in ["STATUS_TRANSITION", "DOCUMENT_REQUIRED", "SOMETHING_NEW"] {
            let result = check(code, "not even json", json!({})).await;
            assert!(result.valid, "{code}");
        }
    }

    #[tokio::test]
    async fn malformed_expression_fails_closed() {
        let result = check("REQUIRED_FIELD", "{field: assetName", json!({"assetName": "x"})).await;
        assert!(!result.valid);
        assert!(
            result
                .message
                .unwrap()
                .starts_with("Malformed rule expression for TEST_RULE")
        );
    }

    #[tokio::test]
    async fn unknown_field_is_an_engine_error() {
        let entity = record(json!({"id": "1", "assetName": "Laptop"}));
        let err = engine()
            .evaluate(
                &rule("REQUIRED_FIELD", r#"{"field":"serialNumber"}"#),
                "ASSET",
                "1",
                &entity,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownField { ref field, .. } if field == "serialNumber"));
    }

    #[test]
    fn patterns_are_cached() {
        let engine = engine();
        engine.pattern("[a-z]+").unwrap();
        engine.pattern("[a-z]+").unwrap();
        assert_eq!(engine.patterns.lock().unwrap().len(), 1);
    }
}
