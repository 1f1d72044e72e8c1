//! Ordered record enrichment.
//!
//! Each annotator reads a record and returns a partial record of new fields.
//! The chain applies steps one at a time over the whole batch and merges each
//! partial result into its record before the next step runs, so later steps
//! can read what earlier steps wrote (the event name reads the hazard type
//! written by the hazard lookup, for example).

pub mod country;
pub mod geo;
pub mod hazard;
pub mod provenance;
pub mod text;

use feedwatch_common::{Record, Result};
use tracing::debug;

pub use country::CountryAnnotator;
pub use geo::{CoordinateSource, GeohashAnnotator, LatLongAnnotator, GEOHASH_PRECISION};
pub use hazard::{HazardType, HazardTypeAnnotator, HazardTypeTable};
pub use provenance::{CopyFieldsAnnotator, EventNameAnnotator, StaticAnnotator, UuidAnnotator};
pub use text::DisplacementAnnotator;

pub trait Annotator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fields to merge into `record`.
    fn annotate(&self, record: &Record) -> Result<Record>;
}

/// Adapter so plain closures can sit in a chain.
pub struct FnAnnotator<F> {
    name: &'static str,
    f: F,
}

pub fn from_fn<F>(name: &'static str, f: F) -> FnAnnotator<F>
where
    F: Fn(&Record) -> Result<Record> + Send + Sync,
{
    FnAnnotator { name, f }
}

impl<F> Annotator for FnAnnotator<F>
where
    F: Fn(&Record) -> Result<Record> + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    fn annotate(&self, record: &Record) -> Result<Record> {
        (self.f)(record)
    }
}

#[derive(Default)]
pub struct AnnotatorChain {
    steps: Vec<Box<dyn Annotator>>,
}

impl AnnotatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Steps run in the order they are added.
    pub fn then(mut self, step: impl Annotator + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    pub fn apply(&self, mut records: Vec<Record>) -> Result<Vec<Record>> {
        for step in &self.steps {
            for record in records.iter_mut() {
                let partial = step.annotate(record)?;
                record.merge(partial);
            }
            debug!(step = step.name(), records = records.len(), "annotate: step applied");
        }
        Ok(records)
    }
}
