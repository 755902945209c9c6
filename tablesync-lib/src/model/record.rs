//! Record access for local querying

use std::collections::BTreeMap;
use std::collections::HashMap;

use super::Value;

/// A record that exposes its fields as dynamic [`Value`]s.
///
/// The local engine only needs field lookup, so any row type can be filtered,
/// sorted and paginated in-process by implementing this trait. A missing
/// field is `None`; a field explicitly holding null may return
/// `Some(Value::Null)`, and both are treated as absent by the engine.
pub trait Record {
    /// Returns the value of a field, if present.
    fn field(&self, name: &str) -> Option<Value>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<Value> {
        match self {
            serde_json::Value::Object(map) => map.field(name),
            _ => None,
        }
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).map(Value::from)
    }
}

impl Record for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Record for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Resolves the identifier of a record for selection tracking.
///
/// Records without a usable id resolve to `""`, which is never selectable.
pub fn record_id<R: Record + ?Sized>(record: &R, id_field: &str) -> String {
    record
        .field(id_field)
        .and_then(|value| value.to_text())
        .unwrap_or_default()
}

/// A simple in-memory record with named fields.
///
/// # Example
///
/// ```
/// use tablesync_lib::model::Record;
/// use tablesync_lib::model::Row;
/// use tablesync_lib::model::Value;
///
/// let row = Row::new()
///     .set("name", "Apple")
///     .set("price", 10);
///
/// assert_eq!(row.field("price"), Some(Value::Number(10.0)));
/// assert_eq!(row.field("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: HashMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Sets a field value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns a reference to a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Record for Row {
    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_record() {
        let record = serde_json::json!({"id": 7, "name": "Apple", "gone": null});
        assert_eq!(record.field("name"), Some(Value::from("Apple")));
        assert_eq!(record.field("gone"), Some(Value::Null));
        assert_eq!(record.field("missing"), None);
        assert_eq!(serde_json::json!([1, 2]).field("name"), None);
    }

    #[test]
    fn test_record_id() {
        let record = serde_json::json!({"id": 7, "uuid": "a-b"});
        assert_eq!(record_id(&record, "id"), "7");
        assert_eq!(record_id(&record, "uuid"), "a-b");
        assert_eq!(record_id(&record, "missing"), "");
        assert_eq!(record_id(&Row::new().set("id", Value::Null), "id"), "");
    }
}
