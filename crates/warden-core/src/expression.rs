//! `ruleExpression` document schemas.
//!
//! A rule stores its parameters as a small JSON document whose shape depends
//! on the rule kind:
//!
//! | Rule kind | Fields |
//! |---|---|
//! | `REQUIRED_FIELD`, `UNIQUE_FIELD` | `field` |
//! | `FORMAT_VALIDATION` | `field`, `pattern` |
//! | `RANGE_VALIDATION` | `field`, `min?`, `max?` |
//! | `LENGTH_VALIDATION` | `field`, `minLength?`, `maxLength?` |
//! | `DATE_VALIDATION` | `field`, `format`, `minDate?`, `maxDate?` |
//! | `REFERENCE_INTEGRITY` | `field`, `referencedEntityType` |
//! | `WARRANTY_EXPIRY`, `AMC_RENEWAL` | `field?` (defaults to `endDate`) |
//!
//! Numeric bounds accept JSON numbers or numeric strings. Documents are stored
//! verbatim; they are parsed only at evaluation time so a malformed document
//! fails its rule instead of failing the write.

use chrono::NaiveDate;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// Default date format for `DATE_VALIDATION`.
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";

/// Default end-date field for `WARRANTY_EXPIRY` and `AMC_RENEWAL`.
pub const DEFAULT_EXPIRY_FIELD: &str = "endDate";

/// Serialize and parse expression documents.
pub trait ExpressionDocument: Serialize + DeserializeOwned {
    /// Encode as the stored JSON document.
    fn to_document(&self) -> String {
        // Expression structs hold only strings, numbers and dates, none of
        // which can fail to serialize.
        serde_json::to_value(self).map_or_else(|_| "{}".to_string(), |value| value.to_string())
    }

    /// Parse a stored document. An empty or blank document reads as `{}`.
    ///
    /// # Errors
    ///
    /// Returns the serde error text when the document is not valid JSON or
    /// lacks required fields.
    fn parse(document: &str) -> Result<Self, String> {
        let document = if document.trim().is_empty() {
            "{}"
        } else {
            document
        };
        serde_json::from_str(document).map_err(|e| e.to_string())
    }
}

/// `REQUIRED_FIELD` / `UNIQUE_FIELD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldExpression {
    pub field: String,
}

/// `FORMAT_VALIDATION`: the rendered field must fully match `pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatExpression {
    pub field: String,
    pub pattern: String,
}

/// `RANGE_VALIDATION`: inclusive numeric bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeExpression {
    pub field: String,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub min: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<f64>,
}

/// `LENGTH_VALIDATION`: inclusive bounds on character count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthExpression {
    pub field: String,
    #[serde(
        default,
        deserialize_with = "lenient_usize",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_length: Option<usize>,
    #[serde(
        default,
        deserialize_with = "lenient_usize",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_length: Option<usize>,
}

/// `DATE_VALIDATION`: parse with `format`, then check the inclusive window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateExpression {
    pub field: String,
    #[serde(default = "default_date_format")]
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<NaiveDate>,
}

/// `REFERENCE_INTEGRITY`: the field holds the id of a `referenced_entity_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceExpression {
    pub field: String,
    pub referenced_entity_type: String,
}

/// `WARRANTY_EXPIRY` / `AMC_RENEWAL`: the end date must not be in the past.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryExpression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ExpiryExpression {
    /// The end-date field to read.
    #[must_use]
    pub fn field_name(&self) -> &str {
        self.field.as_deref().unwrap_or(DEFAULT_EXPIRY_FIELD)
    }
}

impl ExpressionDocument for FieldExpression {}
impl ExpressionDocument for FormatExpression {}
impl ExpressionDocument for RangeExpression {}
impl ExpressionDocument for LengthExpression {}
impl ExpressionDocument for DateExpression {}
impl ExpressionDocument for ReferenceExpression {}
impl ExpressionDocument for ExpiryExpression {}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<LenientNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LenientNumber::Number(n)) => Ok(Some(n)),
        Some(LenientNumber::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("'{s}' is not a number"))),
    }
}

fn lenient_usize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let Some(n) = lenient_f64(deserializer)? else {
        return Ok(None);
    };
    if n < 0.0 || n.fract() != 0.0 || n > usize::MAX as f64 {
        return Err(de::Error::custom(format!(
            "{n} is not a non-negative whole number"
        )));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Some(n as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_expression_document() {
        let expr = FieldExpression {
            field: "assetName".into(),
        };
        assert_eq!(expr.to_document(), r#"{"field":"assetName"}"#);
        assert_eq!(FieldExpression::parse(&expr.to_document()).unwrap(), expr);
    }

    #[test]
    fn range_accepts_numeric_strings() {
        let expr = RangeExpression::parse(r#"{"field":"cost","min":"10","max":250.5}"#).unwrap();
        assert_eq!(expr.min, Some(10.0));
        assert_eq!(expr.max, Some(250.5));
    }

    #[test]
    fn range_bounds_are_optional() {
        let expr = RangeExpression::parse(r#"{"field":"cost"}"#).unwrap();
        assert_eq!(expr.min, None);
        assert_eq!(expr.max, None);
    }

    #[test]
    fn range_rejects_non_numeric_bound() {
        let err = RangeExpression::parse(r#"{"field":"cost","min":"ten"}"#).unwrap_err();
        assert!(err.contains("not a number"), "{err}");
    }

    #[test]
    fn length_uses_camel_case() {
        let expr =
            LengthExpression::parse(r#"{"field":"name","minLength":3,"maxLength":"255"}"#).unwrap();
        assert_eq!(expr.min_length, Some(3));
        assert_eq!(expr.max_length, Some(255));
        assert!(LengthExpression::parse(r#"{"field":"name","minLength":-1}"#).is_err());
        assert!(LengthExpression::parse(r#"{"field":"name","minLength":1.5}"#).is_err());
    }

    #[test]
    fn date_defaults_format() {
        let expr = DateExpression::parse(r#"{"field":"purchaseDate","minDate":"2020-01-01"}"#)
            .unwrap();
        assert_eq!(expr.format, DEFAULT_DATE_FORMAT);
        assert_eq!(expr.min_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(expr.max_date, None);
    }

    #[test]
    fn date_rejects_bad_bound() {
        assert!(DateExpression::parse(r#"{"field":"d","maxDate":"31/12/2030"}"#).is_err());
    }

    #[test]
    fn missing_field_is_an_error() {
        assert!(FieldExpression::parse("{}").is_err());
        assert!(FormatExpression::parse(r#"{"field":"email"}"#).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(FieldExpression::parse("{field: assetName").is_err());
    }

    #[test]
    fn blank_document_reads_as_empty_object() {
        let expr = ExpiryExpression::parse("  ").unwrap();
        assert_eq!(expr.field_name(), DEFAULT_EXPIRY_FIELD);
        let expr = ExpiryExpression::parse(r#"{"field":"warrantyEndDate"}"#).unwrap();
        assert_eq!(expr.field_name(), "warrantyEndDate");
    }

    #[test]
    fn reference_expression_document() {
        let expr = ReferenceExpression {
            field: "vendorId".into(),
            referenced_entity_type: "VENDOR".into(),
        };
        assert_eq!(
            expr.to_document(),
            r#"{"field":"vendorId","referencedEntityType":"VENDOR"}"#
        );
    }
}
