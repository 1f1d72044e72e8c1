//! GDACS RSS: disaster alerts, stored close to the feed's own vocabulary.

use feedwatch_common::{Config, IdentityKey};
use feedwatch_pipeline::{AnnotatorChain, KeyTransformTable, TreeOptions};

use super::{AttachmentSpec, FeedConfig, FeedFormat, FeedPipeline};

pub const NAME: &str = "gdacs";

/// Identity of an item as the feed emits it.
pub const IDENTITY_FIELDS: [&str; 2] = ["pubDate", "eventid"];

/// Identity of a stored record, after the key transform.
pub const PERSISTED_FIELDS: [&str; 2] = ["publisheddate", "id"];

pub const DATE_FIELDS: &[&str] = &["fromdate", "todate", "pubDate"];

pub const KEY_TRANSFORM: &KeyTransformTable = &[
    ("alertlevel", "gdacs_alertlevel"),
    ("cap", "gdacs_cap"),
    ("country", "gdacs_country"),
    ("episodeid", "gdacs_episodeid"),
    ("eventid", "gdacs_eventid"),
    ("eventname", "gdacs_eventname"),
    ("eventtype", "gdacs_eventtype"),
    ("fromdate", "gdacs_fromdate"),
    ("glide", "gdacs_glide"),
    ("gtslink", "gdacs_gtslink"),
    ("population", "gdacs_population"),
    ("resources", "gdacs_resources"),
    ("severity", "gdacs_severity"),
    ("todate", "gdacs_todate"),
    ("version", "gdacs_version"),
    ("vulnerability", "gdacs_vulnerability"),
    ("year", "gdacs_year"),
    ("pubDate", "publisheddate"),
    ("description", "content"),
    ("guid", "id"),
    ("link", "linkurl"),
];

/// Conversion settings shared by every GDACS-derived feed. Nested score
/// blocks and the resource list are stored as markup.
pub fn tree_options() -> TreeOptions {
    TreeOptions::new()
        .with_attributes(["resource"])
        .preserving(["population", "severity", "vulnerability", "resources"])
}

pub fn persisted_key() -> IdentityKey {
    IdentityKey::new(PERSISTED_FIELDS)
}

pub fn pipeline(config: &Config) -> FeedPipeline {
    FeedPipeline::new(
        FeedConfig {
            name: NAME,
            url: config.gdacs_url.clone(),
            format: FeedFormat::Xml(tree_options()),
            identity_key: IdentityKey::new(IDENTITY_FIELDS),
            date_fields: DATE_FIELDS,
            key_transform: KEY_TRANSFORM,
            attachments: Some(AttachmentSpec::gdacs_geojson()),
        },
        AnnotatorChain::new(),
    )
}
