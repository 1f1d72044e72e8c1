use thiserror::Error;

/// Result type alias for feed pipeline operations.
pub type Result<T> = std::result::Result<T, FeedError>;

/// How much of an offending payload is echoed back in a parse error.
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Fetch failed for {url}: {message}")]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Parse error for {origin}: {message} (content: {snippet:?})")]
    Parse {
        origin: String,
        message: String,
        snippet: String,
    },

    #[error("Could not parse date in field {field}: {value:?}")]
    DateParse { field: String, value: String },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid coordinates: {0}")]
    Coordinate(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FeedError {
    /// Build a parse error that carries a short prefix of the raw content.
    pub fn parse(origin: &str, message: impl ToString, content: &[u8]) -> Self {
        let snippet: String = String::from_utf8_lossy(content)
            .chars()
            .take(SNIPPET_CHARS)
            .collect();
        FeedError::Parse {
            origin: origin.to_string(),
            message: message.to_string(),
            snippet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_truncates_snippet() {
        let content = "x".repeat(1000);
        let FeedError::Parse { snippet, origin, .. } =
            FeedError::parse("https://example.org/feed.xml", "bad", content.as_bytes())
        else {
            panic!("expected parse error");
        };
        assert_eq!(snippet.len(), SNIPPET_CHARS);
        assert_eq!(origin, "https://example.org/feed.xml");
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = FeedError::MissingField("eventid".into());
        assert_eq!(err.to_string(), "Missing field: eventid");
    }
}
