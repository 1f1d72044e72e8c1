use std::sync::Arc;

use feedwatch_common::{Record, Result};
use serde_json::Value;
use tracing::debug;

use super::geo::CoordinateSource;
use super::Annotator;
use crate::borders::CountryLookup;

pub const ISO3_FIELD: &str = "iso3";
pub const ISO3_AFFECTED_FIELD: &str = "iso3_affected";
pub const COUNTRY_FIELD: &str = "country_gdal";

/// Resolve the country containing the record's coordinates.
///
/// Never fails: unusable coordinates and points outside every border both
/// produce null country fields. `iso3_affected` is always null; the feed's
/// own multi-country list stays in its source field.
pub struct CountryAnnotator {
    lookup: Arc<dyn CountryLookup>,
    source: CoordinateSource,
}

impl CountryAnnotator {
    pub fn new(lookup: Arc<dyn CountryLookup>, source: CoordinateSource) -> Self {
        Self { lookup, source }
    }
}

impl Annotator for CountryAnnotator {
    fn name(&self) -> &str {
        "country"
    }

    fn annotate(&self, record: &Record) -> Result<Record> {
        let country = match self.source.resolve(record) {
            Ok((lat, lng)) => self.lookup.lookup(lat, lng),
            Err(e) => {
                debug!(error = %e, "country: unusable coordinates");
                None
            }
        };

        let mut out = Record::new();
        out.insert(ISO3_AFFECTED_FIELD, Value::Null);
        match country {
            Some(country) => {
                out.insert(ISO3_FIELD, country.iso3);
                out.insert(COUNTRY_FIELD, country.name);
            }
            None => {
                out.insert(ISO3_FIELD, Value::Null);
                out.insert(COUNTRY_FIELD, Value::Null);
            }
        }
        Ok(out)
    }
}
