//! Pre-built rule drafts for common rule shapes.
//!
//! Templates only build [`RuleDraft`]s. Nothing here touches storage; install
//! a template by passing its draft to `WardenService::create_rule`.

use chrono::NaiveDate;
use serde::Serialize;
use warden_core::codes::{
    ENTITY_ASSET, ENTITY_OUTLET, ENTITY_VENDOR, SEVERITY_CRITICAL, SEVERITY_HIGH, SEVERITY_MEDIUM,
};
use warden_core::entities::RuleDraft;
use warden_core::enums::RuleKind;
use warden_core::expression::{
    DEFAULT_DATE_FORMAT, DateExpression, ExpressionDocument, FieldExpression, FormatExpression,
    LengthExpression,
};
use warden_core::ids::normalize_tag;

pub const EMAIL_PATTERN: &str = "^[A-Za-z0-9+_.-]+@(.+)$";
pub const PHONE_PATTERN: &str = "^[+]?[0-9]{10,15}$";

/// A named template offered to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTemplate {
    /// Stable lookup key, e.g. `asset-assetname-required`.
    pub key: String,
    pub draft: RuleDraft,
}

impl RuleTemplate {
    fn new(draft: RuleDraft) -> Self {
        Self {
            key: draft.rule_code.to_ascii_lowercase().replace('_', "-"),
            draft,
        }
    }
}

fn field_code(entity_type: &str, field: &str, suffix: &str) -> String {
    format!(
        "{}_{}_{suffix}",
        normalize_tag(entity_type),
        field.to_ascii_uppercase()
    )
}

/// `REQUIRED_FIELD` on `field`: CRITICAL, blocking, priority 1.
#[must_use]
pub fn required_field_rule(entity_type: &str, field: &str, display_name: &str) -> RuleDraft {
    RuleDraft::new(
        &field_code(entity_type, field, "REQUIRED"),
        &format!("{display_name} Required"),
        entity_type,
        RuleKind::RequiredField.code(),
        SEVERITY_CRITICAL,
        FieldExpression {
            field: field.to_string(),
        }
        .to_document(),
    )
    .description(format!("{display_name} must not be empty"))
    .error_message(format!("{display_name} is required"))
    .blocking(true)
    .priority(1)
}

/// `UNIQUE_FIELD` on `field`: HIGH, blocking, priority 2.
#[must_use]
pub fn unique_field_rule(entity_type: &str, field: &str, display_name: &str) -> RuleDraft {
    RuleDraft::new(
        &field_code(entity_type, field, "UNIQUE"),
        &format!("{display_name} Unique"),
        entity_type,
        RuleKind::UniqueField.code(),
        SEVERITY_HIGH,
        FieldExpression {
            field: field.to_string(),
        }
        .to_document(),
    )
    .description(format!("{display_name} must be unique"))
    .error_message(format!("{display_name} must be unique"))
    .blocking(true)
    .priority(2)
}

/// Email `FORMAT_VALIDATION`: MEDIUM, non-blocking, priority 50.
#[must_use]
pub fn email_format_rule(entity_type: &str, field: &str) -> RuleDraft {
    RuleDraft::new(
        &format!("{}_EMAIL_FORMAT", normalize_tag(entity_type)),
        "Email Format Validation",
        entity_type,
        RuleKind::FormatValidation.code(),
        SEVERITY_MEDIUM,
        FormatExpression {
            field: field.to_string(),
            pattern: EMAIL_PATTERN.to_string(),
        }
        .to_document(),
    )
    .description("Email must be in valid format")
    .error_message("Email must be in valid format")
    .blocking(false)
    .priority(50)
}

/// Phone `FORMAT_VALIDATION` (10 to 15 digits, optional `+`): MEDIUM,
/// non-blocking, priority 50.
#[must_use]
pub fn phone_format_rule(entity_type: &str, field: &str) -> RuleDraft {
    RuleDraft::new(
        &format!("{}_PHONE_FORMAT", normalize_tag(entity_type)),
        "Phone Format Validation",
        entity_type,
        RuleKind::FormatValidation.code(),
        SEVERITY_MEDIUM,
        FormatExpression {
            field: field.to_string(),
            pattern: PHONE_PATTERN.to_string(),
        }
        .to_document(),
    )
    .description("Phone number must be in valid format")
    .error_message("Phone number must be in valid format (10-15 digits)")
    .blocking(false)
    .priority(50)
}

/// `LENGTH_VALIDATION` with inclusive bounds: MEDIUM, non-blocking,
/// priority 30.
#[must_use]
pub fn length_rule(
    entity_type: &str,
    field: &str,
    min_length: usize,
    max_length: usize,
    display_name: &str,
) -> RuleDraft {
    let message = format!("{display_name} length must be between {min_length} and {max_length}");
    RuleDraft::new(
        &field_code(entity_type, field, "LENGTH"),
        &format!("{display_name} Length Validation"),
        entity_type,
        RuleKind::LengthValidation.code(),
        SEVERITY_MEDIUM,
        LengthExpression {
            field: field.to_string(),
            min_length: Some(min_length),
            max_length: Some(max_length),
        }
        .to_document(),
    )
    .description(message.clone())
    .error_message(message)
    .blocking(false)
    .priority(30)
}

/// `DATE_VALIDATION` over an inclusive window: MEDIUM, non-blocking,
/// priority 40.
#[must_use]
pub fn date_range_rule(
    entity_type: &str,
    field: &str,
    min_date: NaiveDate,
    max_date: NaiveDate,
    display_name: &str,
) -> RuleDraft {
    RuleDraft::new(
        &field_code(entity_type, field, "DATE_RANGE"),
        &format!("{display_name} Date Range Validation"),
        entity_type,
        RuleKind::DateValidation.code(),
        SEVERITY_MEDIUM,
        DateExpression {
            field: field.to_string(),
            format: DEFAULT_DATE_FORMAT.to_string(),
            min_date: Some(min_date),
            max_date: Some(max_date),
        }
        .to_document(),
    )
    .description(format!(
        "{display_name} must be a valid date within allowed range"
    ))
    .error_message(format!(
        "{display_name} must be a valid date between {min_date} and {max_date}"
    ))
    .blocking(false)
    .priority(40)
}

/// The baseline template set.
#[must_use]
pub fn available_templates() -> Vec<RuleTemplate> {
    let mut drafts = vec![
        required_field_rule(ENTITY_ASSET, "assetName", "Asset Name"),
        required_field_rule(ENTITY_VENDOR, "vendorName", "Vendor Name"),
        required_field_rule(ENTITY_OUTLET, "outletName", "Outlet Name"),
        unique_field_rule(ENTITY_ASSET, "assetName", "Asset Name"),
        unique_field_rule(ENTITY_VENDOR, "vendorName", "Vendor Name"),
        unique_field_rule(ENTITY_OUTLET, "outletName", "Outlet Name"),
        email_format_rule(ENTITY_VENDOR, "email"),
        phone_format_rule(ENTITY_VENDOR, "contactNumber"),
        length_rule(ENTITY_ASSET, "assetName", 3, 255, "Asset Name"),
        length_rule(ENTITY_VENDOR, "vendorName", 2, 100, "Vendor Name"),
    ];
    if let (Some(min), Some(max)) = (
        NaiveDate::from_ymd_opt(2020, 1, 1),
        NaiveDate::from_ymd_opt(2030, 12, 31),
    ) {
        drafts.push(date_range_rule(
            ENTITY_ASSET,
            "purchaseDate",
            min,
            max,
            "Purchase Date",
        ));
    }
    drafts.into_iter().map(RuleTemplate::new).collect()
}

/// Template by key or rule code, case-insensitive.
#[must_use]
pub fn find_template(key: &str) -> Option<RuleTemplate> {
    let key = key.trim();
    available_templates()
        .into_iter()
        .find(|t| t.key.eq_ignore_ascii_case(key) || t.draft.rule_code.eq_ignore_ascii_case(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn required_template_shape() {
        let draft = required_field_rule("asset", "assetName", "Asset Name");
        assert_eq!(draft.rule_code, "ASSET_ASSETNAME_REQUIRED");
        assert_eq!(draft.entity_type, "ASSET");
        assert_eq!(draft.rule_type, "REQUIRED_FIELD");
        assert_eq!(draft.severity, "CRITICAL");
        assert_eq!(draft.blocks_operation, Some(true));
        assert_eq!(draft.priority, 1);
        assert_eq!(draft.rule_expression, r#"{"field":"assetName"}"#);
        assert_eq!(draft.error_message.as_deref(), Some("Asset Name is required"));
    }

    #[test]
    fn format_templates_carry_patterns() {
        let email = email_format_rule("VENDOR", "email");
        assert_eq!(email.rule_code, "VENDOR_EMAIL_FORMAT");
        let expr = FormatExpression::parse(&email.rule_expression).unwrap();
        assert_eq!(expr.pattern, EMAIL_PATTERN);

        let phone = phone_format_rule("VENDOR", "contactNumber");
        assert_eq!(phone.rule_code, "VENDOR_PHONE_FORMAT");
        assert_eq!(phone.blocks_operation, Some(false));
        assert_eq!(phone.priority, 50);
    }

    #[test]
    fn length_and_date_templates() {
        let length = length_rule("VENDOR", "vendorName", 2, 100, "Vendor Name");
        let expr = LengthExpression::parse(&length.rule_expression).unwrap();
        assert_eq!((expr.min_length, expr.max_length), (Some(2), Some(100)));
        assert_eq!(length.priority, 30);

        let date = find_template("ASSET_PURCHASEDATE_DATE_RANGE").unwrap().draft;
        let expr = DateExpression::parse(&date.rule_expression).unwrap();
        assert_eq!(expr.format, "yyyy-MM-dd");
        assert_eq!(expr.min_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(expr.max_date, NaiveDate::from_ymd_opt(2030, 12, 31));
        assert_eq!(
            date.error_message.as_deref(),
            Some("Purchase Date must be a valid date between 2020-01-01 and 2030-12-31")
        );
    }

    #[test]
    fn templates_have_unique_keys_and_codes() {
        let templates = available_templates();
        assert_eq!(templates.len(), 11);
        let keys: HashSet<_> = templates.iter().map(|t| t.key.clone()).collect();
        assert_eq!(keys.len(), templates.len());
        let codes: HashSet<_> = templates
            .iter()
            .map(|t| (t.draft.rule_code.clone(), t.draft.entity_type.clone()))
            .collect();
        assert_eq!(codes.len(), templates.len());
    }

    #[test]
    fn find_by_key_or_code() {
        assert!(find_template("vendor-email-format").is_some());
        assert!(find_template("vendor_phone_format").is_some());
        assert!(find_template("nope").is_none());
    }
}
