//! Field values read off entity records.
//!
//! The rule engine never sees concrete entity structs. It asks a record for a
//! named field and gets back a `FieldValue`; typed records answer from a field
//! accessor table, JSON records from their object keys.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// `true` for null and for blank text. Used by REQUIRED_FIELD.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Stringified form used for pattern/length checks and diagnostics.
    /// `None` for null.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Some(dt.to_rfc3339()),
        }
    }

    /// Numeric view for RANGE_VALIDATION. Text is parsed leniently
    /// (surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns a description of the value when it is not numeric.
    pub fn as_f64(&self) -> Result<f64, String> {
        match self {
            Self::Integer(n) => Ok(*n as f64),
            Self::Float(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("'{s}' is not a number")),
            other => Err(format!("{other:?} is not a number")),
        }
    }

    /// Reference view for REFERENCE_INTEGRITY: the id the field points at.
    /// `None` for null, blank text, and non-identifier values; the evaluator
    /// fails the latter.
    #[must_use]
    pub fn as_reference(&self) -> Option<String> {
        match self {
            Self::Integer(n) => Some(n.to_string()),
            Self::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Calendar date view. Text is not parsed here; date parsing depends on the
    /// rule's format and belongs to the evaluator.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<&Value> for FieldValue {
    /// Nested objects carrying an `id` collapse to that id, so a relation
    /// embedded in a JSON record reads as a reference.
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Integer),
            Value::String(s) => Self::Text(s.clone()),
            Value::Object(map) => map
                .get("id")
                .map_or_else(|| Self::Text(value.to_string()), Self::from),
            Value::Array(_) => Self::Text(value.to_string()),
        }
    }
}
