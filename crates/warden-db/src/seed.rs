//! Baseline catalog vocabularies and default rules.
//!
//! Seeding inserts what is missing and never overwrites, so operators can
//! rename or deactivate seeded entries without a restart undoing it.

use tracing::info;
use warden_core::codes::{
    CATEGORY_BUSINESS_RULES, CATEGORY_COMPLIANCE_RULES, CATEGORY_DATA_VALIDATION,
    CATEGORY_SECURITY_RULES, ENTITY_AMC, ENTITY_ASSET, ENTITY_WARRANTY, SEVERITY_CRITICAL,
    SEVERITY_HIGH, SEVERITY_INFO, SEVERITY_LOW, SEVERITY_MEDIUM, STATUS_COMPLIANT,
    STATUS_EXEMPTED, STATUS_NON_COMPLIANT, STATUS_PENDING, STATUS_UNDER_REVIEW,
};
use warden_core::entities::RuleDraft;
use warden_core::enums::RuleKind;
use warden_core::expression::{ExpiryExpression, ExpressionDocument, FieldExpression};

use crate::error::DatabaseError;
use crate::service::WardenService;

/// (code, name, description, category, display order)
pub const STANDARD_RULE_TYPES: &[(&str, &str, &str, &str, i64)] = &[
    ("REQUIRED_FIELD", "Required Field", "Field must carry a value", CATEGORY_DATA_VALIDATION, 1),
    ("UNIQUE_FIELD", "Unique Field", "Field value must be unique across records", CATEGORY_DATA_VALIDATION, 2),
    ("FORMAT_VALIDATION", "Format Validation", "Field must match a pattern", CATEGORY_DATA_VALIDATION, 3),
    ("RANGE_VALIDATION", "Range Validation", "Numeric field must fall within bounds", CATEGORY_DATA_VALIDATION, 4),
    ("LENGTH_VALIDATION", "Length Validation", "Text length must fall within bounds", CATEGORY_DATA_VALIDATION, 5),
    ("REFERENCE_INTEGRITY", "Reference Integrity", "Referenced record must exist", CATEGORY_BUSINESS_RULES, 10),
    ("STATUS_TRANSITION", "Status Transition", "Status changes must follow allowed transitions", CATEGORY_BUSINESS_RULES, 11),
    ("DATE_VALIDATION", "Date Validation", "Date must parse and fall within a window", CATEGORY_BUSINESS_RULES, 12),
    ("RELATIONSHIP_VALIDATION", "Relationship Validation", "Related records must be consistent", CATEGORY_BUSINESS_RULES, 13),
    ("WARRANTY_EXPIRY", "Warranty Expiry", "Warranty must not be expired", CATEGORY_COMPLIANCE_RULES, 20),
    ("AMC_RENEWAL", "AMC Renewal", "AMC must be renewed before it lapses", CATEGORY_COMPLIANCE_RULES, 21),
    ("ASSET_ASSIGNMENT", "Asset Assignment", "Asset must be assigned appropriately", CATEGORY_COMPLIANCE_RULES, 22),
    ("DOCUMENT_REQUIRED", "Document Required", "Supporting documents must be attached", CATEGORY_COMPLIANCE_RULES, 23),
    ("AUDIT_TRAIL", "Audit Trail", "Changes must be auditable", CATEGORY_COMPLIANCE_RULES, 24),
    ("AUTHORIZATION", "Authorization", "Operation requires authorization", CATEGORY_SECURITY_RULES, 30),
    ("DATA_ACCESS", "Data Access", "Data access must be permitted", CATEGORY_SECURITY_RULES, 31),
    ("OPERATION_PERMISSION", "Operation Permission", "Operation must be permitted", CATEGORY_SECURITY_RULES, 32),
];

/// (code, name, description, level, blocks operation)
pub const STANDARD_SEVERITIES: &[(&str, &str, &str, i64, bool)] = &[
    (SEVERITY_CRITICAL, "Critical", "Must be fixed before the operation proceeds", 1, true),
    (SEVERITY_HIGH, "High", "Serious issue that blocks the operation", 2, true),
    (SEVERITY_MEDIUM, "Medium", "Should be fixed soon", 3, false),
    (SEVERITY_LOW, "Low", "Minor issue", 4, false),
    (SEVERITY_INFO, "Info", "Informational only", 5, false),
];

/// (code, name, description, is resolved)
pub const STANDARD_RESOLUTION_STATUSES: &[(&str, &str, &str, bool)] = &[
    (STATUS_COMPLIANT, "Compliant", "Violation fixed", true),
    (STATUS_NON_COMPLIANT, "Non-Compliant", "Violation open", false),
    (STATUS_PENDING, "Pending", "Fix in progress", false),
    (STATUS_EXEMPTED, "Exempted", "Waived by an approver", true),
    (STATUS_UNDER_REVIEW, "Under Review", "Being reviewed", false),
];

/// Rows inserted by a seeding call. Zero everywhere on a repeat call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SeedReport {
    pub rule_types: u64,
    pub severities: u64,
    pub resolution_statuses: u64,
    pub rules: u64,
}

impl SeedReport {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.rule_types + self.severities + self.resolution_statuses + self.rules
    }
}

/// Baseline rules: asset name required and unique, warranty and AMC expiry.
#[must_use]
pub fn default_rules() -> Vec<RuleDraft> {
    let asset_name = FieldExpression {
        field: "assetName".into(),
    }
    .to_document();
    let expiry = ExpiryExpression::default().to_document();

    vec![
        RuleDraft::new(
            "ASSET_NAME_REQUIRED",
            "Asset Name Required",
            ENTITY_ASSET,
            RuleKind::RequiredField.code(),
            SEVERITY_CRITICAL,
            asset_name.clone(),
        )
        .description("Every asset must have a name")
        .error_message("Asset name is required")
        .blocking(true)
        .priority(1),
        RuleDraft::new(
            "ASSET_NAME_UNIQUE",
            "Asset Name Unique",
            ENTITY_ASSET,
            RuleKind::UniqueField.code(),
            SEVERITY_HIGH,
            asset_name,
        )
        .description("Asset names must not repeat")
        .error_message("Asset name must be unique")
        .blocking(true)
        .priority(2),
        RuleDraft::new(
            "WARRANTY_EXPIRY_CHECK",
            "Warranty Expiry Check",
            ENTITY_WARRANTY,
            RuleKind::WarrantyExpiry.code(),
            SEVERITY_MEDIUM,
            expiry.clone(),
        )
        .description("Flags warranties whose end date has passed")
        .error_message("Warranty has expired")
        .blocking(false)
        .priority(10),
        RuleDraft::new(
            "AMC_RENEWAL_CHECK",
            "AMC Renewal Check",
            ENTITY_AMC,
            RuleKind::AmcRenewal.code(),
            SEVERITY_MEDIUM,
            expiry,
        )
        .description("Flags AMC contracts whose end date has passed")
        .error_message("AMC has expired and needs renewal")
        .blocking(false)
        .priority(10),
    ]
}

impl WardenService {
    /// Install the standard rule types, severities, and resolution statuses.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if an insert fails.
    pub async fn seed_catalog(&self) -> Result<SeedReport, DatabaseError> {
        let conn = self.db().conn();
        let mut report = SeedReport::default();

        for (code, name, description, category, order) in STANDARD_RULE_TYPES {
            report.rule_types += conn
                .execute(
                    "INSERT OR IGNORE INTO rule_types (code, name, description, category, display_order)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    libsql::params![*code, *name, *description, *category, *order],
                )
                .await?;
        }
        for (code, name, description, level, blocks) in STANDARD_SEVERITIES {
            report.severities += conn
                .execute(
                    "INSERT OR IGNORE INTO severities (code, name, description, level, blocks_operation)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    libsql::params![*code, *name, *description, *level, i64::from(*blocks)],
                )
                .await?;
        }
        for (code, name, description, resolved) in STANDARD_RESOLUTION_STATUSES {
            report.resolution_statuses += conn
                .execute(
                    "INSERT OR IGNORE INTO resolution_statuses (code, name, description, is_resolved)
                     VALUES (?1, ?2, ?3, ?4)",
                    libsql::params![*code, *name, *description, i64::from(*resolved)],
                )
                .await?;
        }

        if report.total() > 0 {
            info!(
                rule_types = report.rule_types,
                severities = report.severities,
                statuses = report.resolution_statuses,
                "seeded catalog"
            );
        }
        Ok(report)
    }

    /// Install the baseline rules that are not already active.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a lookup or insert fails.
    pub async fn initialize_default_rules(&self, actor: &str) -> Result<SeedReport, DatabaseError> {
        let mut report = SeedReport::default();
        for draft in default_rules() {
            if self
                .find_rule_by_code(&draft.rule_code, &draft.entity_type)
                .await?
                .is_some()
            {
                continue;
            }
            self.create_rule(&draft, actor).await?;
            report.rules += 1;
        }
        if report.rules > 0 {
            info!(rules = report.rules, "installed default rules");
        }
        Ok(report)
    }
}
