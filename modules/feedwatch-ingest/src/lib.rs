pub mod feeds;
pub mod fetcher;
pub mod runner;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use feeds::{AttachmentSpec, FeedConfig, FeedFormat, FeedPipeline};
pub use fetcher::{Fetcher, HttpFetcher};
pub use runner::{ingest, ingest_acled, ingest_gdacs, ingest_hazard_monitoring, IngestSummary, Source};
pub use store::{JsonlStore, MemoryStore, RecordStore};
