use std::sync::LazyLock;

use feedwatch_common::{Record, Result};
use regex::Regex;

use super::Annotator;

pub const DISPLACEMENT_FIELD: &str = "displacement_mentioned";

static DISPLACEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)displace|destro|idp").unwrap());

/// Flag records whose description mentions displacement or destruction.
/// A missing description is not a mention.
pub struct DisplacementAnnotator {
    description_field: String,
}

impl DisplacementAnnotator {
    pub fn new(description_field: &str) -> Self {
        Self {
            description_field: description_field.to_string(),
        }
    }
}

impl Annotator for DisplacementAnnotator {
    fn name(&self) -> &str {
        "displacement_mentioned"
    }

    fn annotate(&self, record: &Record) -> Result<Record> {
        let mentioned = record
            .get_str(&self.description_field)
            .is_some_and(|text| DISPLACEMENT_RE.is_match(text));
        let mut out = Record::new();
        out.insert(DISPLACEMENT_FIELD, mentioned);
        Ok(out)
    }
}
