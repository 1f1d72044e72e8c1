//! One ingestion run per source: transform the feed, drop what the store
//! already holds, insert the rest as a single batch.

use std::fmt;
use std::sync::Arc;

use feedwatch_common::{Config, IdentityKey, Record, Result, SeenKeys};
use feedwatch_pipeline::{filter_unseen, CountryLookup, Deduplicator};
use tracing::info;

use crate::feeds::{acled, gdacs, hazard_monitoring};
use crate::fetcher::Fetcher;
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Gdacs,
    HazardMonitoring,
    Acled,
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Source::Gdacs => gdacs::NAME,
            Source::HazardMonitoring => hazard_monitoring::NAME,
            Source::Acled => acled::NAME,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub source: Source,
    /// Records produced by the pipeline, before filtering against the store.
    pub fetched: usize,
    pub inserted: usize,
    pub pages: u32,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} fetched, {} inserted ({} page{})",
            self.source,
            self.fetched,
            self.inserted,
            self.pages,
            if self.pages == 1 { "" } else { "s" }
        )
    }
}

pub async fn ingest(
    source: Source,
    config: &Config,
    fetcher: &dyn Fetcher,
    store: &dyn RecordStore,
    countries: Arc<dyn CountryLookup>,
) -> Result<IngestSummary> {
    match source {
        Source::Gdacs => ingest_gdacs(config, fetcher, store).await,
        Source::HazardMonitoring => {
            ingest_hazard_monitoring(config, fetcher, store, countries).await
        }
        Source::Acled => ingest_acled(config, fetcher, store).await,
    }
}

pub async fn ingest_gdacs(
    config: &Config,
    fetcher: &dyn Fetcher,
    store: &dyn RecordStore,
) -> Result<IngestSummary> {
    let records = gdacs::pipeline(config)
        .run(fetcher, &SeenKeys::new())
        .await?;
    persist_new(Source::Gdacs, store, &gdacs::persisted_key(), records, 1).await
}

pub async fn ingest_hazard_monitoring(
    config: &Config,
    fetcher: &dyn Fetcher,
    store: &dyn RecordStore,
    countries: Arc<dyn CountryLookup>,
) -> Result<IngestSummary> {
    let hazards = hazard_monitoring::load_hazard_table(fetcher, &config.hazard_types_url).await?;
    let records = hazard_monitoring::pipeline(config, Arc::new(hazards), countries)
        .run(fetcher, &SeenKeys::new())
        .await?;
    persist_new(
        Source::HazardMonitoring,
        store,
        &hazard_monitoring::persisted_key(),
        records,
        1,
    )
    .await
}

/// Walk result pages from 1 until a page has nothing new or the page cap is
/// reached. ACLED ids are stored under their feed name, so persisted keys
/// seed the deduplicator directly.
pub async fn ingest_acled(
    config: &Config,
    fetcher: &dyn Fetcher,
    store: &dyn RecordStore,
) -> Result<IngestSummary> {
    let key = acled::identity_key();
    let mut dedup = Deduplicator::seeded(store.existing_keys(&key).await?);
    let mut records = Vec::new();
    let mut pages = 0;

    for page in 1..=config.acled_max_pages {
        let fresh = acled::page_pipeline(config, page)
            .run_with(fetcher, &mut dedup)
            .await?;
        pages = page;
        if fresh.is_empty() {
            info!(page, "acled: no new records, stopping");
            break;
        }
        records.extend(fresh);
    }

    let fetched = records.len();
    let inserted = store.insert(&records).await?;
    let summary = IngestSummary {
        source: Source::Acled,
        fetched,
        inserted,
        pages,
    };
    info!(%summary, "ingest: complete");
    Ok(summary)
}

async fn persist_new(
    source: Source,
    store: &dyn RecordStore,
    key: &IdentityKey,
    records: Vec<Record>,
    pages: u32,
) -> Result<IngestSummary> {
    let fetched = records.len();
    let existing = store.existing_keys(key).await?;
    let fresh = filter_unseen(records, key, &existing)?;
    let inserted = store.insert(&fresh).await?;

    let summary = IngestSummary {
        source,
        fetched,
        inserted,
        pages,
    };
    info!(%summary, skipped = fetched - inserted, "ingest: complete");
    Ok(summary)
}
