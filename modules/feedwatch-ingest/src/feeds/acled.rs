//! ACLED conflict events from the paged JSON read API.

use feedwatch_common::{Config, IdentityKey};
use feedwatch_pipeline::annotate::{
    CoordinateSource, CopyFieldsAnnotator, GeohashAnnotator, StaticAnnotator, UuidAnnotator,
};
use feedwatch_pipeline::{AnnotatorChain, KeyTransformTable};

use super::{FeedConfig, FeedFormat, FeedPipeline};

pub const NAME: &str = "acled";

pub const DATA_FIELD: &str = "data";

/// ACLED's own event id; the same name before and after the transform.
pub const IDENTITY_FIELDS: [&str; 1] = ["data_id"];

pub const DATE_FIELDS: &[&str] = &["event_date"];

/// Stored under ACLED's own field names.
pub const KEY_TRANSFORM: &KeyTransformTable = &[];

pub fn identity_key() -> IdentityKey {
    IdentityKey::new(IDENTITY_FIELDS)
}

pub fn annotators() -> AnnotatorChain {
    AnnotatorChain::new()
        .then(CopyFieldsAnnotator::new(
            "ally_actors",
            &[("assoc_actor_1", "ally_actor_1"), ("assoc_actor_2", "ally_actor_2")],
        ))
        .then(GeohashAnnotator::new(
            CoordinateSource::fields("latitude", "longitude"),
            "location_id",
        ))
        .then(StaticAnnotator::nulls("gwno", ["gwno"]))
        .then(UuidAnnotator::new("uuid_acled"))
}

/// Pipeline for one result page (1-based).
pub fn page_pipeline(config: &Config, page: u32) -> FeedPipeline {
    FeedPipeline::new(
        FeedConfig {
            name: NAME,
            url: config.acled_page_url(page),
            format: FeedFormat::Json {
                data_field: DATA_FIELD,
            },
            identity_key: identity_key(),
            date_fields: DATE_FIELDS,
            key_transform: KEY_TRANSFORM,
            attachments: None,
        },
        annotators(),
    )
}
