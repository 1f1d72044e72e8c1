//! Secondary payloads referenced from inside a feed item.
//!
//! GDACS items list their resources as raw markup; the first `.geojson` link
//! found there is fetched and stored on the item as text.

use std::sync::LazyLock;

use feedwatch_common::Record;
use futures::future::join_all;
use regex::Regex;
use tracing::{debug, warn};

use crate::fetcher::Fetcher;

static GEOJSON_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://)?[\w/\-?=%.]+\.geojson").unwrap());

/// First `.geojson` link in `text`, if any.
pub fn find_geojson_link(text: &str) -> Option<&str> {
    GEOJSON_LINK_RE.find(text).map(|m| m.as_str())
}

#[derive(Debug, Clone)]
pub struct AttachmentSpec {
    /// Field searched for a link (rendered to text first).
    pub source_field: &'static str,
    /// Field receiving the fetched body, `""` when there is none.
    pub payload_field: &'static str,
    /// Field receiving the link that was fetched, `""` when there is none.
    pub link_field: &'static str,
}

impl AttachmentSpec {
    pub const fn gdacs_geojson() -> Self {
        Self {
            source_field: "resources",
            payload_field: "gdacs_geojson",
            link_field: "gdacs_geojson_link",
        }
    }

    /// Fetch every item's attachment concurrently. A failed fetch is logged and
    /// leaves the empty placeholders; it never fails the batch.
    pub async fn attach(&self, fetcher: &dyn Fetcher, records: Vec<Record>) -> Vec<Record> {
        join_all(records.into_iter().map(|record| self.attach_one(fetcher, record))).await
    }

    async fn attach_one(&self, fetcher: &dyn Fetcher, mut record: Record) -> Record {
        let link = find_geojson_link(&record.text_or_empty(self.source_field)).map(str::to_string);
        record.insert(self.payload_field, "");
        record.insert(self.link_field, "");

        let Some(link) = link else {
            return record;
        };

        match fetcher.fetch(&link).await {
            Ok(body) => {
                debug!(link = link.as_str(), bytes = body.len(), "attachment: fetched");
                record.insert(self.payload_field, String::from_utf8_lossy(&body).into_owned());
                record.insert(self.link_field, link);
            }
            Err(e) => {
                warn!(link = link.as_str(), error = %e, "attachment: fetch failed, leaving empty");
            }
        }
        record
    }
}
