use feedwatch_common::{render_value, FeedError, Record, Result};
use serde_json::Value;

use super::Annotator;

/// Geohash length used for `location_id` (~5m cells).
pub const GEOHASH_PRECISION: usize = 9;

/// Where a record keeps its coordinates.
#[derive(Debug, Clone)]
pub enum CoordinateSource {
    /// Flat fields holding numbers or numeric strings (ACLED).
    Fields { latitude: String, longitude: String },
    /// A converted GeoRSS `Point` branch: a list of `{lat}` and `{long}`
    /// fragments (GDACS).
    PointBranch { field: String },
}

impl CoordinateSource {
    pub fn fields(latitude: &str, longitude: &str) -> Self {
        CoordinateSource::Fields {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        }
    }

    pub fn point_branch(field: &str) -> Self {
        CoordinateSource::PointBranch {
            field: field.to_string(),
        }
    }

    /// The raw latitude and longitude values as the feed supplied them.
    pub fn raw(&self, record: &Record) -> Result<(Value, Value)> {
        match self {
            CoordinateSource::Fields {
                latitude,
                longitude,
            } => Ok((
                record.require(latitude)?.clone(),
                record.require(longitude)?.clone(),
            )),
            CoordinateSource::PointBranch { field } => {
                let fragments = record
                    .get(field)
                    .and_then(Value::as_array)
                    .ok_or_else(|| FeedError::Coordinate(format!("no {field} branch")))?;
                let lat = find_in_fragments(fragments, "lat")
                    .ok_or_else(|| FeedError::Coordinate(format!("{field} has no lat")))?;
                let long = find_in_fragments(fragments, "long")
                    .ok_or_else(|| FeedError::Coordinate(format!("{field} has no long")))?;
                Ok((lat.clone(), long.clone()))
            }
        }
    }

    /// Parsed, range-checked `(lat, lng)`.
    pub fn resolve(&self, record: &Record) -> Result<(f64, f64)> {
        let (lat, lng) = self.raw(record).map_err(|e| match e {
            FeedError::MissingField(field) => FeedError::Coordinate(format!("missing {field}")),
            other => other,
        })?;
        let lat = as_degrees(&lat)?;
        let lng = as_degrees(&lng)?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(FeedError::Coordinate(format!("out of range: ({lat}, {lng})")));
        }
        Ok((lat, lng))
    }
}

fn find_in_fragments<'a>(fragments: &'a [Value], key: &str) -> Option<&'a Value> {
    fragments.iter().find_map(|fragment| fragment.get(key))
}

fn as_degrees(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| FeedError::Coordinate(format!("not a number: {:?}", render_value(value))))
}

/// Encode the record's coordinates as a fixed-precision geohash.
pub struct GeohashAnnotator {
    source: CoordinateSource,
    output: String,
    precision: usize,
}

impl GeohashAnnotator {
    pub fn new(source: CoordinateSource, output: &str) -> Self {
        Self {
            source,
            output: output.to_string(),
            precision: GEOHASH_PRECISION,
        }
    }
}

impl Annotator for GeohashAnnotator {
    fn name(&self) -> &str {
        "geohash"
    }

    fn annotate(&self, record: &Record) -> Result<Record> {
        let (lat, lng) = self.source.resolve(record)?;
        let hash = geohash::encode(geohash::Coord { x: lng, y: lat }, self.precision)
            .map_err(|e| FeedError::Coordinate(e.to_string()))?;
        let mut out = Record::new();
        out.insert(self.output.clone(), hash);
        Ok(out)
    }
}

/// Copy the raw coordinates out of a nested branch into flat
/// `latitude` / `longitude` fields.
pub struct LatLongAnnotator {
    source: CoordinateSource,
}

impl LatLongAnnotator {
    pub fn new(source: CoordinateSource) -> Self {
        Self { source }
    }
}

impl Annotator for LatLongAnnotator {
    fn name(&self) -> &str {
        "lat_long"
    }

    fn annotate(&self, record: &Record) -> Result<Record> {
        let (lat, lng) = self.source.raw(record)?;
        let mut out = Record::new();
        out.insert("latitude", lat);
        out.insert("longitude", lng);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::from(map),
            _ => panic!("test record must be an object"),
        }
    }

    fn acled_geohash() -> GeohashAnnotator {
        GeohashAnnotator::new(CoordinateSource::fields("latitude", "longitude"), "location_id")
    }

    #[test]
    fn geohash_is_pinned_and_deterministic() {
        let rec = record(json!({"latitude": "49.7821", "longitude": "3.5708"}));
        let first = acled_geohash().annotate(&rec).unwrap();
        let second = acled_geohash().annotate(&rec).unwrap();
        assert_eq!(first.get_str("location_id"), Some("u0fe1q81v"));
        assert_eq!(first, second);
    }

    #[test]
    fn geohash_accepts_numbers() {
        let rec = record(json!({"latitude": 49.7821, "longitude": 3.5708}));
        let out = acled_geohash().annotate(&rec).unwrap();
        assert_eq!(out.get_str("location_id").map(str::len), Some(GEOHASH_PRECISION));
    }

    #[test]
    fn geohash_from_point_branch() {
        let rec = record(json!({"Point": [{"lat": "49.7821"}, {"long": "3.5708"}]}));
        let annotator = GeohashAnnotator::new(CoordinateSource::point_branch("Point"), "location_id");
        let out = annotator.annotate(&rec).unwrap();
        assert_eq!(out.get_str("location_id"), Some("u0fe1q81v"));
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        let rec = record(json!({"latitude": "north", "longitude": "3.5"}));
        let err = acled_geohash().annotate(&rec).unwrap_err();
        assert!(matches!(err, FeedError::Coordinate(_)));
    }

    #[test]
    fn absent_coordinates_are_rejected() {
        let err = acled_geohash().annotate(&record(json!({"latitude": "1"}))).unwrap_err();
        assert!(matches!(err, FeedError::Coordinate(_)));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let rec = record(json!({"latitude": "91", "longitude": "0"}));
        assert!(matches!(
            acled_geohash().annotate(&rec).unwrap_err(),
            FeedError::Coordinate(_)
        ));
    }

    #[test]
    fn lat_long_copies_raw_values() {
        let rec = record(json!({"Point": [{"lat": "-6.2"}, {"long": "106.8"}]}));
        let out = LatLongAnnotator::new(CoordinateSource::point_branch("Point"))
            .annotate(&rec)
            .unwrap();
        assert_eq!(out.get_str("latitude"), Some("-6.2"));
        assert_eq!(out.get_str("longitude"), Some("106.8"));
    }
}
