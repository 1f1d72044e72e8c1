//! Hazard monitoring: the GDACS feed annotated into IDMC's displacement schema.
//!
//! Same payload and identity as GDACS, plus the IDMC hazard translator table
//! (fetched once per run), geolocation, provenance and country annotations.

use std::sync::Arc;

use feedwatch_common::{Config, IdentityKey, Result};
use feedwatch_pipeline::annotate::{
    CoordinateSource, CountryAnnotator, DisplacementAnnotator, EventNameAnnotator,
    GeohashAnnotator, HazardTypeAnnotator, HazardTypeTable, LatLongAnnotator, StaticAnnotator,
    UuidAnnotator,
};
use feedwatch_pipeline::{AnnotatorChain, CountryLookup, KeyTransformTable};
use serde_json::json;
use tracing::info;

use super::{gdacs, FeedConfig, FeedFormat, FeedPipeline};
use crate::fetcher::Fetcher;

pub const NAME: &str = "hazard_monitoring";

pub const SOURCE_NAME: &str = "GDACS";
pub const DISPLACEMENT_TYPE: &str = "Disaster";

pub const PERSISTED_FIELDS: [&str; 2] = ["pub_date", "event_id"];

pub const DATE_FIELDS: &[&str] = &["fromdate", "pubDate", "todate"];

/// Branch holding the GeoRSS coordinates.
const POINT_FIELD: &str = "Point";

/// Destination columns the feed has no data for.
const UNAVAILABLE_FIELDS: [&str; 8] = [
    "hazard_type_source",
    "exposed_50",
    "exposed_20",
    "exposed_5",
    "evacuations",
    "homeless",
    "injured",
    "fatalities",
];

pub const KEY_TRANSFORM: &KeyTransformTable = &[
    ("fromdate", "start_date"),
    ("glide", "glide_number"),
    ("todate", "end_date"),
    ("pubDate", "pub_date"),
    ("eventid", "event_id"),
    ("eventname", "event_name"),
    ("eventtype", "hazard_code_source"),
    ("alertlevel", "alert_score"),
    ("population", "affected"),
    // the feed's own (possibly multi-country) list
    ("country", "countries_affected"),
    // the country enclosing the event's coordinates
    ("country_gdal", "country"),
    ("link", "source_url"),
];

pub fn persisted_key() -> IdentityKey {
    IdentityKey::new(PERSISTED_FIELDS)
}

pub async fn load_hazard_table(fetcher: &dyn Fetcher, url: &str) -> Result<HazardTypeTable> {
    let content = fetcher.fetch(url).await?;
    let table = HazardTypeTable::from_csv(&content, url)?;
    info!(url, rows = table.len(), "hazard_monitoring: hazard table loaded");
    Ok(table)
}

pub fn annotators(hazards: Arc<HazardTypeTable>, countries: Arc<dyn CountryLookup>) -> AnnotatorChain {
    let point = CoordinateSource::point_branch(POINT_FIELD);
    AnnotatorChain::new()
        .then(HazardTypeAnnotator::new(hazards, "eventtype"))
        .then(DisplacementAnnotator::new("description"))
        .then(GeohashAnnotator::new(point.clone(), "location_id"))
        .then(UuidAnnotator::new("uuid_hazard"))
        .then(LatLongAnnotator::new(point.clone()))
        .then(StaticAnnotator::new(
            "source",
            [
                ("source_name", json!(SOURCE_NAME)),
                ("displacement_type", json!(DISPLACEMENT_TYPE)),
            ],
        ))
        .then(EventNameAnnotator::new(
            "idmc_event_name",
            "country",
            "hazard_type",
            "fromdate",
        ))
        .then(StaticAnnotator::nulls("unavailable", UNAVAILABLE_FIELDS))
        .then(StaticAnnotator::new("comment", [("comment", json!(""))]))
        .then(CountryAnnotator::new(countries, point))
}

pub fn pipeline(
    config: &Config,
    hazards: Arc<HazardTypeTable>,
    countries: Arc<dyn CountryLookup>,
) -> FeedPipeline {
    FeedPipeline::new(
        FeedConfig {
            name: NAME,
            url: config.gdacs_url.clone(),
            // GDACS conversion, so population and severity stay as raw markup
            format: FeedFormat::Xml(gdacs::tree_options()),
            identity_key: IdentityKey::new(gdacs::IDENTITY_FIELDS),
            date_fields: DATE_FIELDS,
            key_transform: KEY_TRANSFORM,
            attachments: None,
        },
        annotators(hazards, countries),
    )
}
