//! JSON Feed version 1: document model, parsing, canonical serialization,
//! and a pluggable fetch boundary.
//!
//! Parsing is lenient by intent. Unknown fields are skipped and missing
//! required fields (`title`, `items`, item `id`) come back empty instead of
//! failing, since many published feeds omit them. Only malformed JSON, or
//! JSON of the wrong shape, is an error.
//!
//! ```
//! let feed = jsonfeed::parse(r#"{"title":"t","items":[],"expired":false}"#).unwrap();
//! assert_eq!(feed.version, jsonfeed::DEFAULT_VERSION);
//! assert!(jsonfeed::serialize(&feed).contains("\"expired\": false"));
//! ```

pub mod config;
pub mod feed;
pub mod util;

pub use config::{ConfigError, FetcherConfig};
pub use feed::{
    follow_pages, load_from_uri, parse, parse_slice, parse_timestamp, serialize,
    serialize_compact, Attachment, Author, Feed, FetchError, FetchText, FileFetcher, HttpFetcher,
    Hub, Item, LoadError, ParseError, DEFAULT_VERSION,
};
