//! Generic field access on entity records.
//!
//! The engine reads fields by name through [`EntityRecord`]. Typed entities
//! answer from a [`FieldTable`] built once per type; JSON entities from their
//! object keys. `None` from [`EntityRecord::field`] means the record type has
//! no such field, which is a rule configuration error rather than a missing
//! value.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};
use warden_core::field::FieldValue;

/// Read-only view of one business entity.
pub trait EntityRecord: Send + Sync {
    /// The record's own id, when it carries one.
    fn id(&self) -> Option<String>;

    /// Value of a named field; `None` if the record type has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

type Extractor<T> = fn(&T) -> FieldValue;

/// Field-name to extractor table for a typed entity.
///
/// ```
/// use std::sync::LazyLock;
/// use warden_engine::records::FieldTable;
///
/// struct Vendor { name: String }
///
/// static VENDOR_FIELDS: LazyLock<FieldTable<Vendor>> =
///     LazyLock::new(|| FieldTable::new().with("vendorName", |v| v.name.clone().into()));
///
/// let v = Vendor { name: "Acme".into() };
/// assert!(VENDOR_FIELDS.read(&v, "vendorName").is_some());
/// assert!(VENDOR_FIELDS.read(&v, "nope").is_none());
/// ```
pub struct FieldTable<T> {
    extractors: HashMap<&'static str, Extractor<T>>,
}

impl<T> FieldTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: &'static str, extractor: Extractor<T>) -> Self {
        self.extractors.insert(name, extractor);
        self
    }

    #[must_use]
    pub fn read(&self, record: &T, name: &str) -> Option<FieldValue> {
        self.extractors.get(name).map(|extract| extract(record))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.extractors.keys().copied()
    }
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A JSON object as an entity record.
///
/// `known_fields` is the field set of the record's type. A key absent from
/// this object but known to the type reads as null; a key unknown to the
/// type reads as no such field. Without a field set only present keys exist.
#[derive(Debug, Clone)]
pub struct JsonRecord {
    object: Map<String, Value>,
    known_fields: Option<Arc<BTreeSet<String>>>,
}

impl JsonRecord {
    #[must_use]
    pub const fn new(object: Map<String, Value>) -> Self {
        Self {
            object,
            known_fields: None,
        }
    }

    #[must_use]
    pub fn with_known_fields(mut self, fields: Arc<BTreeSet<String>>) -> Self {
        self.known_fields = Some(fields);
        self
    }

    /// Build from any JSON value; non-objects are rejected.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(Self::new(object)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn object(&self) -> &Map<String, Value> {
        &self.object
    }

    /// Union of keys over `records`, for use as a shared field set.
    #[must_use]
    pub fn field_set<'a>(records: impl IntoIterator<Item = &'a Self>) -> BTreeSet<String> {
        records
            .into_iter()
            .flat_map(|r| r.object.keys().cloned())
            .collect()
    }
}

impl EntityRecord for JsonRecord {
    fn id(&self) -> Option<String> {
        self.object
            .get("id")
            .and_then(|v| FieldValue::from(v).as_reference())
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match self.object.get(name) {
            Some(value) => Some(FieldValue::from(value)),
            None => self
                .known_fields
                .as_ref()
                .filter(|known| known.contains(name))
                .map(|_| FieldValue::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::LazyLock;

    struct Warranty {
        id: i64,
        end_date: Option<NaiveDate>,
        provider: String,
    }

    static WARRANTY_FIELDS: LazyLock<FieldTable<Warranty>> = LazyLock::new(|| {
        FieldTable::new()
            .with("endDate", |w: &Warranty| w.end_date.into())
            .with("provider", |w: &Warranty| w.provider.clone().into())
    });

    impl EntityRecord for Warranty {
        fn id(&self) -> Option<String> {
            Some(self.id.to_string())
        }

        fn field(&self, name: &str) -> Option<FieldValue> {
            WARRANTY_FIELDS.read(self, name)
        }
    }

    #[test]
    fn typed_record_reads_through_table() {
        let w = Warranty {
            id: 7,
            end_date: None,
            provider: "Acme".into(),
        };
        assert_eq!(w.field("endDate"), Some(FieldValue::Null));
        assert_eq!(w.field("provider"), Some(FieldValue::Text("Acme".into())));
        assert_eq!(w.field("startDate"), None);
        assert_eq!(w.id().as_deref(), Some("7"));
        let mut names: Vec<_> = WARRANTY_FIELDS.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["endDate", "provider"]);
    }

    #[test]
    fn json_record_fields() {
        let record = JsonRecord::from_value(json!({"id": 3, "assetName": null, "cost": 10})).unwrap();
        assert_eq!(record.id().as_deref(), Some("3"));
        assert_eq!(record.field("assetName"), Some(FieldValue::Null));
        assert_eq!(record.field("cost"), Some(FieldValue::Integer(10)));
        assert_eq!(record.field("serial"), None);
    }

    #[test]
    fn json_record_known_fields_fill_nulls() {
        let a = JsonRecord::from_value(json!({"id": "a", "serial": "S1"})).unwrap();
        let b = JsonRecord::from_value(json!({"id": "b"})).unwrap();
        let known = Arc::new(JsonRecord::field_set([&a, &b]));
        let b = b.with_known_fields(known);
        assert_eq!(b.field("serial"), Some(FieldValue::Null));
        assert_eq!(b.field("colour"), None);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(JsonRecord::from_value(json!([1, 2])).is_none());
    }
}
