//! Serde roundtrip and JsonSchema validation tests for entity and result types.

use std::collections::BTreeMap;

use chrono::Utc;
use schemars::schema_for;
use warden_core::entities::*;
use warden_core::enums::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_violation() -> Violation {
    Violation {
        id: "vio-b7a3f9e2".into(),
        rule_id: Some("rul-a3f8b2c1".into()),
        entity_type: "ASSET".into(),
        entity_id: "42".into(),
        severity: "CRITICAL".into(),
        blocks_operation: true,
        status: "NON_COMPLIANT".into(),
        violation_message: "Asset name is required".into(),
        violated_field: Some("assetName".into()),
        expected_value: Some("non-empty value".into()),
        actual_value: None,
        detected_at: Utc::now(),
        resolved_at: None,
        resolved_by: None,
        resolution_notes: None,
        active: true,
    }
}

roundtrip_and_validate!(
    rule_type_roundtrip,
    RuleType,
    RuleType {
        code: "REQUIRED_FIELD".into(),
        name: "Required Field".into(),
        description: Some("Field must carry a value".into()),
        category: "DATA_VALIDATION".into(),
        display_order: 1,
        active: true,
    }
);

roundtrip_and_validate!(
    severity_roundtrip,
    Severity,
    Severity {
        code: "HIGH".into(),
        name: "High".into(),
        description: None,
        level: 2,
        blocks_operation: true,
        active: true,
    }
);

roundtrip_and_validate!(
    resolution_status_roundtrip,
    ResolutionStatus,
    ResolutionStatus {
        code: "EXEMPTED".into(),
        name: "Exempted".into(),
        description: Some("Waived by an approver".into()),
        is_resolved: true,
        active: true,
    }
);

roundtrip_and_validate!(
    catalog_entry_roundtrip,
    CatalogEntry,
    CatalogEntry::Severity(Severity {
        code: "LOW".into(),
        name: "Low".into(),
        description: None,
        level: 4,
        blocks_operation: false,
        active: true,
    })
);

roundtrip_and_validate!(
    rule_definition_roundtrip,
    RuleDefinition,
    RuleDefinition {
        id: "rul-a3f8b2c1".into(),
        rule_code: "ASSET_NAME_REQUIRED".into(),
        rule_name: "Asset name required".into(),
        description: None,
        entity_type: "ASSET".into(),
        rule_type: "REQUIRED_FIELD".into(),
        severity: "CRITICAL".into(),
        rule_expression: r#"{"field":"assetName"}"#.into(),
        error_message: Some("Asset name is required".into()),
        blocks_operation: true,
        priority: 1,
        active: true,
        created_by: Some("SYSTEM".into()),
        updated_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    rule_draft_roundtrip,
    RuleDraft,
    RuleDraft::new(
        "vendor_name_length",
        "Vendor name length",
        "vendor",
        "LENGTH_VALIDATION",
        "medium",
        r#"{"field":"vendorName","minLength":2,"maxLength":100}"#,
    )
    .priority(30)
);

roundtrip_and_validate!(violation_roundtrip, Violation, sample_violation());

roundtrip_and_validate!(
    resolved_violation_roundtrip,
    Violation,
    Violation {
        status: "COMPLIANT".into(),
        resolved_at: Some(Utc::now()),
        resolved_by: Some("auditor".into()),
        resolution_notes: Some("Name backfilled".into()),
        ..sample_violation()
    }
);

roundtrip_and_validate!(
    check_result_roundtrip,
    CheckResult,
    CheckResult::evaluated("ASSET", "42", 2, vec![sample_violation()])
);

roundtrip_and_validate!(
    check_result_no_rules_roundtrip,
    CheckResult,
    CheckResult::no_rules("OUTLET", "7")
);

roundtrip_and_validate!(
    compliance_report_roundtrip,
    ComplianceReport,
    ComplianceReport {
        entity_type: "ASSET".into(),
        entity_id: "42".into(),
        status: "NON_COMPLIANT".into(),
        total_violations: 1,
        violations_by_severity: BTreeMap::from([
            ("CRITICAL".to_string(), 1),
            ("HIGH".to_string(), 0),
        ]),
        violations: vec![sample_violation()],
        generated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    metrics_roundtrip,
    ComplianceMetrics,
    ComplianceMetrics {
        entity_type: None,
        total_entities: 10,
        compliant_entities: 8,
        non_compliant_entities: 2,
        total_violations: 5,
        unresolved_violations: 3,
        by_severity: BTreeMap::from([("CRITICAL".to_string(), 3)]),
        by_entity_type: BTreeMap::from([("ASSET".to_string(), 3)]),
        generated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    summary_roundtrip,
    ViolationSummary,
    ViolationSummary {
        total: 1,
        by_severity: BTreeMap::from([("CRITICAL".to_string(), 1)]),
        recent_count: 1,
        recent_violations: vec![sample_violation()],
        window_days: 7,
        generated_at: Utc::now(),
    }
);

#[test]
fn check_outcome_serializes_snake_case() {
    let json = serde_json::to_string(&CheckOutcome::EntityNotFound).unwrap();
    assert_eq!(json, "\"entity_not_found\"");
}

#[test]
fn catalog_entry_is_tagged_by_kind() {
    let entry = CatalogEntry::ResolutionStatus(ResolutionStatus {
        code: "PENDING".into(),
        name: "Pending".into(),
        description: None,
        is_resolved: false,
        active: true,
    });
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["kind"], "resolution_status");
    assert_eq!(entry.kind(), CatalogKind::ResolutionStatus);
    assert_eq!(entry.code(), "PENDING");
}
