//! Markup document to generic tree conversion.
//!
//! Every element becomes a mapping keyed by its local tag name. Leaves hold
//! their text, branches hold the converted children in document order. Tags
//! listed in `preserve_raw` keep their exact source markup instead of being
//! recursed into, and tags listed in `attributes_required` carry their
//! attributes alongside the tag key.
//!
//! Input is UTF-8 unless the declaration names ISO-8859-1 (or US-ASCII),
//! which is transcoded first. Any other declared encoding is rejected.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use feedwatch_common::{FeedError, Result};
use regex::bytes::Regex;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-feed conversion settings.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub attributes_required: HashSet<String>,
    pub preserve_raw: HashSet<String>,
}

impl TreeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes_required
            .extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn preserving<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preserve_raw.extend(tags.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// Leaf text; `None` for an empty element.
    Text(Option<String>),
    /// Converted child nodes, document order.
    Children(Vec<GenericNode>),
    /// Verbatim markup of a preserved subtree.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenericNode {
    /// A child that does not resolve to an element (comment, processing
    /// instruction). Renders as the empty mapping.
    Empty,
    Element {
        tag: String,
        value: NodeValue,
        attributes: BTreeMap<String, String>,
    },
}

impl GenericNode {
    pub fn tag(&self) -> Option<&str> {
        match self {
            GenericNode::Element { tag, .. } => Some(tag),
            GenericNode::Empty => None,
        }
    }

    /// Converted children, empty for leaves, raw subtrees and `Empty`.
    pub fn children(&self) -> &[GenericNode] {
        match self {
            GenericNode::Element {
                value: NodeValue::Children(children),
                ..
            } => children,
            _ => &[],
        }
    }

    /// The merged mapping for this node: `{tag: value}` plus any retained
    /// attributes. Attributes are written after the tag key.
    pub fn to_fragment(&self) -> Map<String, Value> {
        let mut fragment = Map::new();
        if let GenericNode::Element {
            tag,
            value,
            attributes,
        } = self
        {
            fragment.insert(tag.clone(), value.to_json());
            for (name, attr) in attributes {
                fragment.insert(name.clone(), Value::String(attr.clone()));
            }
        }
        fragment
    }
}

impl NodeValue {
    fn to_json(&self) -> Value {
        match self {
            NodeValue::Text(Some(text)) => Value::String(text.clone()),
            NodeValue::Text(None) => Value::Null,
            NodeValue::Raw(markup) => Value::String(markup.clone()),
            NodeValue::Children(children) => Value::Array(
                children
                    .iter()
                    .map(|child| Value::Object(child.to_fragment()))
                    .collect(),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Parse raw feed bytes and convert the root element. `origin` (usually the
/// feed URL) is carried into parse errors.
pub fn parse_document(content: &[u8], origin: &str, options: &TreeOptions) -> Result<GenericNode> {
    let text = decode(content).map_err(|message| FeedError::parse(origin, message, content))?;

    let parsing = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let document = roxmltree::Document::parse_with_options(&text, parsing)
        .map_err(|e| FeedError::parse(origin, e, content))?;

    Ok(convert(document.root_element(), &text, options))
}

static DECLARED_ENCODING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?-u)^<\?xml[^>]*?\bencoding\s*=\s*["']([A-Za-z0-9._-]+)["']"#).unwrap()
});

/// Feed bytes as text. Latin-1 maps byte for byte onto the first 256 code
/// points; the declaration is rewritten so the parser sees UTF-8.
fn decode(content: &[u8]) -> std::result::Result<Cow<'_, str>, String> {
    let declared = DECLARED_ENCODING_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|name| {
            let label = String::from_utf8_lossy(name.as_bytes()).to_ascii_lowercase();
            (name.range(), label)
        });

    match declared {
        None => utf8(content),
        Some((_, name)) if name == "utf-8" || name == "utf8" => utf8(content),
        Some((range, name)) if is_latin1(&name) => {
            let mut text = String::with_capacity(content.len() + 8);
            text.extend(content[..range.start].iter().map(|&b| char::from(b)));
            text.push_str("UTF-8");
            text.extend(content[range.end..].iter().map(|&b| char::from(b)));
            Ok(Cow::Owned(text))
        }
        Some((_, name)) => Err(format!("unsupported encoding {name:?}")),
    }
}

fn utf8(content: &[u8]) -> std::result::Result<Cow<'_, str>, String> {
    std::str::from_utf8(content)
        .map(Cow::Borrowed)
        .map_err(|e| format!("invalid UTF-8: {e}"))
}

fn is_latin1(name: &str) -> bool {
    matches!(
        name,
        "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" | "us-ascii" | "ascii"
    )
}

/// Convert one node. Recursion is unbounded; feed documents are shallow.
pub fn convert(node: roxmltree::Node<'_, '_>, source: &str, options: &TreeOptions) -> GenericNode {
    if !node.is_element() {
        return GenericNode::Empty;
    }
    let tag = node.tag_name().name();
    if tag.is_empty() {
        return GenericNode::Empty;
    }

    if options.preserve_raw.contains(tag) {
        let markup = source.get(node.range()).unwrap_or_default();
        return GenericNode::Element {
            tag: tag.to_string(),
            value: NodeValue::Raw(markup.to_string()),
            attributes: BTreeMap::new(),
        };
    }

    let children: Vec<_> = node.children().filter(|child| !child.is_text()).collect();
    let value = if children.is_empty() {
        NodeValue::Text(node.text().map(str::to_string))
    } else {
        NodeValue::Children(
            children
                .into_iter()
                .map(|child| convert(child, source, options))
                .collect(),
        )
    };

    let attributes = if options.attributes_required.contains(tag) {
        node.attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect()
    } else {
        BTreeMap::new()
    };

    GenericNode::Element {
        tag: tag.to_string(),
        value,
        attributes,
    }
}
