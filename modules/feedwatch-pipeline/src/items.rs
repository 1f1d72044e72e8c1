use feedwatch_common::Record;

use crate::tree::GenericNode;

pub const CHANNEL_TAG: &str = "channel";
pub const ITEM_TAG: &str = "item";

/// Flatten every `item` branch of the converted feed into one record.
///
/// A missing channel means "no items", not an error.
pub fn extract_items(tree: &GenericNode) -> Vec<Record> {
    let Some(channel) = find_channel(tree) else {
        return Vec::new();
    };

    channel
        .children()
        .iter()
        .filter(|child| child.tag() == Some(ITEM_TAG))
        .map(flatten_item)
        .collect()
}

fn find_channel(tree: &GenericNode) -> Option<&GenericNode> {
    if tree.tag() == Some(CHANNEL_TAG) {
        return Some(tree);
    }
    tree.children()
        .iter()
        .find(|child| child.tag() == Some(CHANNEL_TAG))
}

// Later fragments overwrite earlier ones on key collision.
fn flatten_item(item: &GenericNode) -> Record {
    let mut record = Record::new();
    for fragment in item.children() {
        record.merge(Record::from(fragment.to_fragment()));
    }
    record
}
