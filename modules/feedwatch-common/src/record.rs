use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FeedError, Result};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One flattened feed item: field name to JSON value.
///
/// Intermediate stages treat the shape as open. Destination field names are
/// only enforced when the key transform table is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String value of a field, `None` when absent or not a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Borrow a field that must be present.
    pub fn require(&self, field: &str) -> Result<&Value> {
        self.0
            .get(field)
            .ok_or_else(|| FeedError::MissingField(field.to_string()))
    }

    /// Shallow merge: every key of `other` overwrites the same key here.
    pub fn merge(&mut self, other: Record) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Display text for a field. Absent and null fields render as "".
    pub fn text_or_empty(&self, field: &str) -> String {
        self.0.get(field).map(render_value).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Render a value as the plain text used for identity tuples and display
/// strings. Strings are unquoted, null is empty, everything else is JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Identity keys
// ---------------------------------------------------------------------------

/// Rendered values of an identity key, in key order.
pub type IdentityTuple = Vec<String>;

/// Identity tuples already known to the caller (persisted, or seen earlier in
/// the same run).
pub type SeenKeys = HashSet<IdentityTuple>;

/// Ordered field names whose values identify a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityKey {
    fields: Vec<String>,
}

impl IdentityKey {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Extract this key's tuple from a record. Every field must be present.
    pub fn tuple(&self, record: &Record) -> Result<IdentityTuple> {
        self.fields
            .iter()
            .map(|field| record.require(field).map(render_value))
            .collect()
    }
}
