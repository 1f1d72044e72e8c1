use feedwatch_common::{Record, Result};
use serde_json::Value;
use uuid::Uuid;

use super::Annotator;

/// Attach the same fields to every record: provenance constants, or
/// destination columns the feed does not supply (as explicit nulls).
pub struct StaticAnnotator {
    name: &'static str,
    fields: Record,
}

impl StaticAnnotator {
    pub fn new<I, S>(name: &'static str, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Self {
            name,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Every named field set to null.
    pub fn nulls<I, S>(name: &'static str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, fields.into_iter().map(|f| (f, Value::Null)))
    }
}

impl Annotator for StaticAnnotator {
    fn name(&self) -> &str {
        self.name
    }

    fn annotate(&self, _record: &Record) -> Result<Record> {
        Ok(self.fields.clone())
    }
}

/// Fresh random UUID per record, used as a surrogate key.
pub struct UuidAnnotator {
    field: String,
}

impl UuidAnnotator {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

impl Annotator for UuidAnnotator {
    fn name(&self) -> &str {
        "uuid"
    }

    fn annotate(&self, _record: &Record) -> Result<Record> {
        let mut out = Record::new();
        out.insert(self.field.clone(), Uuid::new_v4().to_string());
        Ok(out)
    }
}

/// Human-readable event name: `"{country}: {hazard} - {start}"`.
/// Absent or null parts render as empty segments.
pub struct EventNameAnnotator {
    output: String,
    country_field: String,
    hazard_field: String,
    date_field: String,
}

impl EventNameAnnotator {
    pub fn new(output: &str, country_field: &str, hazard_field: &str, date_field: &str) -> Self {
        Self {
            output: output.to_string(),
            country_field: country_field.to_string(),
            hazard_field: hazard_field.to_string(),
            date_field: date_field.to_string(),
        }
    }
}

impl Annotator for EventNameAnnotator {
    fn name(&self) -> &str {
        "event_name"
    }

    fn annotate(&self, record: &Record) -> Result<Record> {
        let name = format!(
            "{}: {} - {}",
            record.text_or_empty(&self.country_field),
            record.text_or_empty(&self.hazard_field),
            record.text_or_empty(&self.date_field),
        );
        let mut out = Record::new();
        out.insert(self.output.clone(), name);
        Ok(out)
    }
}

/// Copy fields under new names, keeping the originals. Absent sources copy
/// as null.
pub struct CopyFieldsAnnotator {
    name: &'static str,
    pairs: Vec<(String, String)>,
}

impl CopyFieldsAnnotator {
    pub fn new(name: &'static str, pairs: &[(&str, &str)]) -> Self {
        Self {
            name,
            pairs: pairs
                .iter()
                .map(|(src, dest)| (src.to_string(), dest.to_string()))
                .collect(),
        }
    }
}

impl Annotator for CopyFieldsAnnotator {
    fn name(&self) -> &str {
        self.name
    }

    fn annotate(&self, record: &Record) -> Result<Record> {
        Ok(self
            .pairs
            .iter()
            .map(|(src, dest)| (dest.clone(), record.get(src).cloned().unwrap_or(Value::Null)))
            .collect())
    }
}
