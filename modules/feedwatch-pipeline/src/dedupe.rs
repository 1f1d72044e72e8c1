use feedwatch_common::{IdentityKey, Record, Result, SeenKeys};
use tracing::debug;

/// First-seen-wins record filter over an identity key.
///
/// The seen set lives as long as the deduplicator. Seed it with tuples the
/// caller already knows about, or reuse one instance across pages of the same
/// run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: SeenKeys,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seen: SeenKeys) -> Self {
        Self { seen }
    }

    /// Keep each record whose identity tuple has not been seen, in input order.
    /// Fails on the first record missing an identity field.
    pub fn dedupe(&mut self, records: Vec<Record>, key: &IdentityKey) -> Result<Vec<Record>> {
        let total = records.len();
        let mut kept = Vec::with_capacity(total);
        for record in records {
            let tuple = key.tuple(&record)?;
            if self.seen.insert(tuple) {
                kept.push(record);
            }
        }
        debug!(total, kept = kept.len(), key = ?key.fields(), "dedupe: filtered");
        Ok(kept)
    }

    pub fn seen(&self) -> &SeenKeys {
        &self.seen
    }

    pub fn into_seen(self) -> SeenKeys {
        self.seen
    }
}

/// Deduplicate one batch with a fresh seen set.
pub fn dedupe(records: Vec<Record>, key: &IdentityKey) -> Result<Vec<Record>> {
    Deduplicator::new().dedupe(records, key)
}

/// Drop records whose identity tuple is already in `seen`, without recording
/// the survivors. Used against persisted state.
pub fn filter_unseen(records: Vec<Record>, key: &IdentityKey, seen: &SeenKeys) -> Result<Vec<Record>> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if !seen.contains(&key.tuple(&record)?) {
            kept.push(record);
        }
    }
    Ok(kept)
}
