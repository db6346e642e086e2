use crate::feed::model::Feed;
use serde_json::error::Category;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The input could not be decoded into a [`Feed`].
///
/// Raised for malformed JSON and for structurally wrong JSON, such as an
/// object where the item list belongs. Missing or `null` fields never
/// produce this error, numeric item ids are accepted, and timestamps are
/// kept as text so an unusual date cannot reject the document.
#[derive(Debug, Error)]
#[error("Invalid feed document: {source}")]
pub struct ParseError {
    #[from]
    source: serde_json::Error,
}

impl ParseError {
    /// 1-based line where decoding stopped.
    pub fn line(&self) -> usize {
        self.source.line()
    }

    /// 1-based column where decoding stopped.
    pub fn column(&self) -> usize {
        self.source.column()
    }

    /// True when the input is not well-formed JSON, as opposed to JSON of the
    /// wrong shape.
    pub fn is_syntax(&self) -> bool {
        matches!(self.source.classify(), Category::Syntax | Category::Eof)
    }
}

/// Decodes a feed from JSON text.
///
/// Unknown fields are ignored at every level, and `null` reads as absent.
/// Absent fields stay `None`, with two exceptions: `version` becomes
/// [`DEFAULT_VERSION`] and `items` becomes an empty list. Missing `title` or
/// item `id` are accepted.
///
/// [`DEFAULT_VERSION`]: crate::feed::DEFAULT_VERSION
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not valid JSON or does not match the
/// feed structure. No partial feed is returned.
///
/// # Examples
///
/// ```
/// let feed = jsonfeed::parse(r#"{"title":"t","items":[]}"#).unwrap();
/// assert_eq!(feed.version, jsonfeed::DEFAULT_VERSION);
/// ```
pub fn parse(text: &str) -> Result<Feed, ParseError> {
    Ok(serde_json::from_str(text)?)
}

/// Decodes a feed from UTF-8 bytes, such as a raw HTTP body.
pub fn parse_slice(bytes: &[u8]) -> Result<Feed, ParseError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encodes a feed as indented JSON in canonical key order.
///
/// `None` fields are left out entirely; `Some(false)` is written.
///
/// # Panics
///
/// Only if the encoder rejects a value, which the feed types cannot produce.
pub fn serialize(feed: &Feed) -> String {
    serde_json::to_string_pretty(feed).expect("feed tree is always encodable")
}

/// Encodes a feed as single-line JSON in canonical key order.
pub fn serialize_compact(feed: &Feed) -> String {
    serde_json::to_string(feed).expect("feed tree is always encodable")
}

impl FromStr for Feed {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}
