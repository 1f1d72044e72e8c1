//! Per-source feed configuration and the one orchestrator that runs them.
//!
//! A source is data, not a type: its URL, how to decode the payload, its
//! identity key, date fields, key transform table, annotator chain and an
//! optional attachment pre-step. `FeedPipeline::run` applies the stages in a
//! fixed order:
//!
//! fetch → decode → dedupe → attachments → dates → annotate → remap

pub mod acled;
pub mod attachments;
pub mod gdacs;
pub mod hazard_monitoring;

use feedwatch_common::{FeedError, IdentityKey, Record, Result, SeenKeys};
use feedwatch_pipeline::{
    extract_items, normalize_dates, parse_document, remap, AnnotatorChain, Deduplicator,
    KeyTransformTable, TreeOptions,
};
use serde_json::Value;
use tracing::info;

use crate::fetcher::Fetcher;
pub use attachments::AttachmentSpec;

#[derive(Debug, Clone)]
pub enum FeedFormat {
    /// RSS-style markup flattened through the tree converter.
    Xml(TreeOptions),
    /// A JSON object holding an array of item objects under `data_field`.
    Json { data_field: &'static str },
}

pub struct FeedConfig {
    pub name: &'static str,
    pub url: String,
    pub format: FeedFormat,
    pub identity_key: IdentityKey,
    pub date_fields: &'static [&'static str],
    pub key_transform: &'static KeyTransformTable,
    pub attachments: Option<AttachmentSpec>,
}

pub struct FeedPipeline {
    config: FeedConfig,
    annotators: AnnotatorChain,
}

impl FeedPipeline {
    pub fn new(config: FeedConfig, annotators: AnnotatorChain) -> Self {
        Self { config, annotators }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn annotators(&self) -> &AnnotatorChain {
        &self.annotators
    }

    /// Turn the raw payload into one record per item.
    pub fn decode(&self, content: &[u8]) -> Result<Vec<Record>> {
        let origin = self.config.url.as_str();
        match &self.config.format {
            FeedFormat::Xml(options) => {
                let tree = parse_document(content, origin, options)?;
                Ok(extract_items(&tree))
            }
            FeedFormat::Json { data_field } => decode_json(content, origin, data_field),
        }
    }

    /// Fetch and transform the feed. `seen` holds identity tuples, in the form
    /// the feed emits them, that should be treated as already ingested.
    pub async fn run(&self, fetcher: &dyn Fetcher, seen: &SeenKeys) -> Result<Vec<Record>> {
        let mut dedup = Deduplicator::seeded(seen.clone());
        self.run_with(fetcher, &mut dedup).await
    }

    /// Like `run`, but records every kept identity tuple in `dedup` so a
    /// caller can carry the seen set across pages.
    pub async fn run_with(
        &self,
        fetcher: &dyn Fetcher,
        dedup: &mut Deduplicator,
    ) -> Result<Vec<Record>> {
        let feed = self.config.name;
        let content = fetcher.fetch(&self.config.url).await?;
        let items = self.decode(&content)?;
        let decoded = items.len();

        let mut records = dedup.dedupe(items, &self.config.identity_key)?;
        if let Some(ref spec) = self.config.attachments {
            records = spec.attach(fetcher, records).await;
        }
        let records = normalize_dates(records, self.config.date_fields)?;
        let records = self.annotators.apply(records)?;
        let records = remap(records, self.config.key_transform)?;

        info!(
            feed,
            url = self.config.url.as_str(),
            decoded,
            output = records.len(),
            "feed: transformed"
        );
        Ok(records)
    }
}

fn decode_json(content: &[u8], origin: &str, data_field: &str) -> Result<Vec<Record>> {
    let body: Value =
        serde_json::from_slice(content).map_err(|e| FeedError::parse(origin, e, content))?;
    let Some(items) = body.get(data_field).and_then(Value::as_array) else {
        return Err(FeedError::parse(
            origin,
            format!("no `{data_field}` array in response"),
            content,
        ));
    };

    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => Ok(Record::from(map.clone())),
            _ => Err(FeedError::parse(origin, "item is not an object", content)),
        })
        .collect()
}
