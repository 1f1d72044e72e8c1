//! Country lookup by point-in-polygon over country border shapes.
//!
//! Borders are read from a GeoJSON FeatureCollection (Polygon and
//! MultiPolygon features, `ISO3`/`NAME` properties as in the world borders
//! dataset). Containment is strict: a point lying exactly on a border is in
//! neither country. Overlapping shapes resolve to whichever comes first in
//! the file.

use std::path::Path;

use anyhow::Context;
use feedwatch_common::{FeedError, Result};
use geo::{BoundingRect, Contains, Intersects, LineString, MultiPolygon, Point, Polygon, Rect};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub iso3: String,
    pub name: String,
}

/// Given a coordinate, the enclosing country if one is known.
pub trait CountryLookup: Send + Sync {
    fn lookup(&self, lat: f64, lng: f64) -> Option<Country>;
}

/// Lookup used when no borders dataset is configured.
pub struct NoCountryLookup;

impl CountryLookup for NoCountryLookup {
    fn lookup(&self, _lat: f64, _lng: f64) -> Option<Country> {
        None
    }
}

// ---------------------------------------------------------------------------
// GeoJSON input
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Map<String, Value>,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

const ISO3_KEYS: &[&str] = &["ISO3", "iso3", "ISO_A3"];
const NAME_KEYS: &[&str] = &["NAME", "name", "ADMIN"];

fn property(properties: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| properties.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

struct Shape {
    country: Country,
    bbox: Rect<f64>,
    area: MultiPolygon<f64>,
}

pub struct BorderIndex {
    shapes: Vec<Shape>,
}

impl BorderIndex {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read borders file {}", path.display()))?;
        Self::from_geojson(&content, &path.display().to_string())
    }

    pub fn from_geojson(content: &[u8], origin: &str) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_slice(content).map_err(|e| FeedError::parse(origin, e, content))?;

        let mut shapes = Vec::new();
        for feature in collection.features {
            let Some(iso3) = property(&feature.properties, ISO3_KEYS) else {
                continue;
            };
            let name = property(&feature.properties, NAME_KEYS).unwrap_or_else(|| iso3.clone());
            let area = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => {
                    MultiPolygon::new(vec![to_polygon(coordinates)])
                }
                Some(Geometry::MultiPolygon { coordinates }) => {
                    coordinates.into_iter().map(to_polygon).collect()
                }
                Some(Geometry::Unsupported) | None => continue,
            };
            let Some(bbox) = area.bounding_rect() else {
                continue;
            };

            shapes.push(Shape {
                country: Country { iso3, name },
                bbox,
                area,
            });
        }

        info!(origin, countries = shapes.len(), "borders: loaded");
        Ok(Self { shapes })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl CountryLookup for BorderIndex {
    fn lookup(&self, lat: f64, lng: f64) -> Option<Country> {
        let point = Point::new(lng, lat);
        self.shapes
            .iter()
            .filter(|shape| shape.bbox.intersects(&point.0))
            .find(|shape| shape.area.contains(&point))
            .map(|shape| shape.country.clone())
    }
}

/// GeoJSON rings as a polygon; the first ring is the exterior, the rest are
/// holes. Positions are (lng, lat), extra ordinates are dropped.
fn to_polygon(rings: Vec<Vec<Vec<f64>>>) -> Polygon<f64> {
    let mut rings = rings.into_iter().map(|ring| {
        LineString::from(
            ring.into_iter()
                .filter(|pos| pos.len() >= 2)
                .map(|pos| (pos[0], pos[1]))
                .collect::<Vec<_>>(),
        )
    });
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(exterior, rings.collect())
}
