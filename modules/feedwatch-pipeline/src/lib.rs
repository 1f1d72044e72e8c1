pub mod annotate;
pub mod borders;
pub mod dates;
pub mod dedupe;
pub mod items;
pub mod mapper;
pub mod tree;

pub use annotate::{Annotator, AnnotatorChain};
pub use borders::{BorderIndex, Country, CountryLookup, NoCountryLookup};
pub use dates::{normalize_dates, parse_date};
pub use dedupe::{dedupe, filter_unseen, Deduplicator};
pub use items::extract_items;
pub use mapper::{remap, KeyTransformTable};
pub use tree::{parse_document, GenericNode, NodeValue, TreeOptions};
