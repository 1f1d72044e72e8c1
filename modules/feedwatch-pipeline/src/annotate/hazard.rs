use std::sync::Arc;

use feedwatch_common::{FeedError, Record, Result};
use serde_json::Value;
use tracing::info;

use super::Annotator;

// CSV columns of the IDMC hazard translator.
pub const EVENT_TYPE_COLUMN: &str = "GDACS_eventtype";
pub const HAZARD_ID_COLUMN: &str = "IDMC_id";
pub const HAZARD_TYPE_COLUMN: &str = "IDMC_type";

// Fields written onto records.
pub const HAZARD_TYPE_ID_FIELD: &str = "hazard_type_id";
pub const HAZARD_TYPE_FIELD: &str = "hazard_type";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardType {
    pub event_type: String,
    pub hazard_id: String,
    pub hazard_type: String,
}

/// Source event type to IDMC hazard rows, loaded once per run.
///
/// Event types are not guaranteed unique; lookups return the first row.
#[derive(Debug, Clone, Default)]
pub struct HazardTypeTable {
    rows: Vec<HazardType>,
}

impl HazardTypeTable {
    pub fn new(rows: Vec<HazardType>) -> Self {
        Self { rows }
    }

    /// Read the translator CSV. The join column is `GDACS_eventtype` when the
    /// header names it, otherwise the first column.
    pub fn from_csv(content: &[u8], origin: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content);

        let headers = reader
            .headers()
            .map_err(|e| FeedError::parse(origin, e, content))?
            .clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let event_col = column(EVENT_TYPE_COLUMN).unwrap_or(0);
        let id_col = column(HAZARD_ID_COLUMN).ok_or_else(|| {
            FeedError::parse(origin, format!("missing {HAZARD_ID_COLUMN} column"), content)
        })?;
        let type_col = column(HAZARD_TYPE_COLUMN).ok_or_else(|| {
            FeedError::parse(origin, format!("missing {HAZARD_TYPE_COLUMN} column"), content)
        })?;

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| FeedError::parse(origin, e, content))?;
            let cell = |i: usize| row.get(i).unwrap_or_default().to_string();
            rows.push(HazardType {
                event_type: cell(event_col),
                hazard_id: cell(id_col),
                hazard_type: cell(type_col),
            });
        }

        info!(origin, rows = rows.len(), "hazard types: loaded");
        Ok(Self { rows })
    }

    pub fn lookup(&self, event_type: &str) -> Option<&HazardType> {
        self.rows.iter().find(|row| row.event_type == event_type)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Join the record's event type against the hazard table. No match, or no
/// event type, writes nulls.
pub struct HazardTypeAnnotator {
    table: Arc<HazardTypeTable>,
    event_type_field: String,
}

impl HazardTypeAnnotator {
    pub fn new(table: Arc<HazardTypeTable>, event_type_field: &str) -> Self {
        Self {
            table,
            event_type_field: event_type_field.to_string(),
        }
    }
}

impl Annotator for HazardTypeAnnotator {
    fn name(&self) -> &str {
        "hazard_type"
    }

    fn annotate(&self, record: &Record) -> Result<Record> {
        let matched = record
            .get_str(&self.event_type_field)
            .and_then(|event_type| self.table.lookup(event_type));

        let mut out = Record::new();
        match matched {
            Some(row) => {
                out.insert(HAZARD_TYPE_ID_FIELD, row.hazard_id.clone());
                out.insert(HAZARD_TYPE_FIELD, row.hazard_type.clone());
            }
            None => {
                out.insert(HAZARD_TYPE_ID_FIELD, Value::Null);
                out.insert(HAZARD_TYPE_FIELD, Value::Null);
            }
        }
        Ok(out)
    }
}
