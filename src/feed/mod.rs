//! JSON Feed document model, codec and fetching.
//!
//! - [`model`] - Entity types: [`Feed`], [`Author`], [`Hub`], [`Item`], [`Attachment`]
//! - [`parser`] - Pure text ⇄ entity conversion; no I/O, no logging
//! - [`fetcher`] - The [`FetchText`] boundary plus HTTP and file collaborators
//! - [`pages`] - Walking a pagination chain via `next_url`
//!
//! # Example
//!
//! ```
//! use jsonfeed::feed::{parse, serialize, Item};
//!
//! let mut feed = parse(r#"{"title":"Blog","items":[]}"#).unwrap();
//! feed.items.push(Item::new("1"));
//! assert!(serialize(&feed).contains("\"id\": \"1\""));
//! ```

pub mod fetcher;
pub mod model;
pub mod pages;
pub mod parser;

pub use fetcher::{load_from_uri, FetchError, FetchText, FileFetcher, HttpFetcher, LoadError};
pub use model::{parse_timestamp, Attachment, Author, Feed, Hub, Item, DEFAULT_VERSION};
pub use pages::follow_pages;
pub use parser::{parse, parse_slice, serialize, serialize_compact, ParseError};
