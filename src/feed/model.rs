//! Entity types for a JSON Feed version 1 document.
//!
//! The tree is plain owned data: a [`Feed`] owns its [`Author`], [`Hub`]s
//! and [`Item`]s, and each item owns its attachments and tags. Nothing is
//! shared between feeds, so values can be cloned, sent across threads and
//! compared freely.
//!
//! # Wire mapping
//!
//! Field names follow the JSON Feed v1 wire names (`home_page_url`,
//! `content_html`, `size_in_bytes`, ...). Struct fields are declared in the
//! canonical key order, which is the order serde emits them in.
//!
//! Every field except `version` and `items` is an `Option` and is omitted
//! from output when `None`. That includes the fields the format calls
//! required (`title`, item `id`, attachment `url` and `mime_type`): real
//! feeds leave them out or set them to `null`, and a missing value must stay
//! missing on the way back out. An explicit `null` reads the same as an
//! absent key everywhere.
//!
//! Timestamps are kept as the text the publisher wrote. [`Item::published_at`]
//! and [`Item::modified_at`] interpret it, accepting RFC 3339 as well as the
//! looser ISO-8601 shapes seen in the wild.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};
use std::fmt;

/// Version URI written when a document does not name one.
pub const DEFAULT_VERSION: &str = "https://jsonfeed.org/version/1";

/// Top-level feed document.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feed {
    /// URL of the format version the feed uses.
    #[serde(deserialize_with = "version_or_default")]
    pub version: String,
    /// Name of the feed, usually the name of the site.
    pub title: Option<String>,
    pub home_page_url: Option<String>,
    /// URL of the feed itself; serves as its identifier.
    pub feed_url: Option<String>,
    pub description: Option<String>,
    /// Note for people reading the raw JSON; readers ignore it.
    pub user_comment: Option<String>,
    /// Next page of a paginated feed. Must differ from `feed_url` and from
    /// every earlier `next_url` in the chain.
    pub next_url: Option<String>,
    pub icon: Option<String>,
    pub favicon: Option<String>,
    pub author: Option<Author>,
    /// `Some(true)` marks a finished feed. `None` and `Some(false)` both mean
    /// it may still update, but only `None` is left out of the output.
    pub expired: Option<bool>,
    /// Endpoints offering real-time change notifications.
    pub hubs: Option<Vec<Hub>>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub items: Vec<Item>,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            title: None,
            home_page_url: None,
            feed_url: None,
            description: None,
            user_comment: None,
            next_url: None,
            icon: None,
            favicon: None,
            author: None,
            expired: None,
            hubs: None,
            items: Vec::new(),
        }
    }
}

impl Feed {
    /// Creates an empty feed with the default version and the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Whether the publisher has declared the feed finished.
    pub fn is_expired(&self) -> bool {
        self.expired == Some(true)
    }

    /// Looks up an item by its identifier.
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id.as_deref() == Some(id))
    }
}

/// Author of a feed or an item.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: Option<String>,
    /// Site owned by the author: a blog, a social profile, or a `mailto:` link.
    pub url: Option<String>,
    pub avatar: Option<String>,
}

/// Real-time notification endpoint, e.g. WebSub.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hub {
    /// Protocol identifier such as `"WebSub"`.
    #[serde(rename = "type")]
    pub hub_type: Option<String>,
    pub url: Option<String>,
}

impl Hub {
    pub fn new(hub_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            hub_type: Some(hub_type.into()),
            url: Some(url.into()),
        }
    }
}

/// A single post, episode, or other piece of content.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    /// Stable identifier; readers use it to detect new and changed items, so
    /// it must not change when the title or URL does. Numeric ids are read
    /// as their decimal text.
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// Permalink to the item on the publisher's site.
    pub url: Option<String>,
    /// Page the item is about, for link-blog style posts.
    pub external_url: Option<String>,
    pub title: Option<String>,
    pub content_text: Option<String>,
    pub content_html: Option<String>,
    pub summary: Option<String>,
    /// Main image, shown in a reader's article view.
    pub image: Option<String>,
    /// Image shown above the item, like a header.
    pub banner_image: Option<String>,
    pub date_published: Option<String>,
    pub date_modified: Option<String>,
    pub author: Option<Author>,
    pub tags: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// True when the item carries a text or HTML body. The format asks for at
    /// least one, but parsing does not enforce it.
    pub fn has_content(&self) -> bool {
        self.content_text.is_some() || self.content_html.is_some()
    }

    /// `date_published` as a point in time, if it can be read as one.
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.date_published.as_deref().and_then(parse_timestamp)
    }

    /// `date_modified` as a point in time, if it can be read as one.
    pub fn modified_at(&self) -> Option<DateTime<FixedOffset>> {
        self.date_modified.as_deref().and_then(parse_timestamp)
    }

    /// Stores `at` as an RFC 3339 `date_published`.
    pub fn set_published_at(&mut self, at: DateTime<FixedOffset>) {
        self.date_published = Some(at.to_rfc3339());
    }

    /// Stores `at` as an RFC 3339 `date_modified`.
    pub fn set_modified_at(&mut self, at: DateTime<FixedOffset>) {
        self.date_modified = Some(at.to_rfc3339());
    }
}

/// Related resource, typically podcast audio or video.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub url: Option<String>,
    pub mime_type: Option<String>,
    /// Name for the attachment. Attachments sharing a title are alternate
    /// formats of the same resource.
    pub title: Option<String>,
    pub size_in_bytes: Option<u64>,
    pub duration_in_seconds: Option<f64>,
}

impl Attachment {
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            mime_type: Some(mime_type.into()),
            ..Self::default()
        }
    }
}

/// Reads an ISO-8601 timestamp.
///
/// Values without an offset are taken as UTC; a bare date means midnight UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at);
    }
    // Basic-format offset, e.g. -0500
    if let Ok(at) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(at);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

// ============================================================================
// Lenient field decoders
// ============================================================================

fn version_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(|| DEFAULT_VERSION.to_string()))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feed_uses_default_version() {
        let feed = Feed::new("Example");
        assert_eq!(feed.version, DEFAULT_VERSION);
        assert_eq!(feed.title.as_deref(), Some("Example"));
        assert!(feed.items.is_empty());
        assert!(feed.hubs.is_none());
    }

    #[test]
    fn test_default_feed_has_no_title() {
        assert!(Feed::default().title.is_none());
    }

    #[test]
    fn test_is_expired_tri_state() {
        let mut feed = Feed::new("t");
        assert!(!feed.is_expired());
        feed.expired = Some(false);
        assert!(!feed.is_expired());
        feed.expired = Some(true);
        assert!(feed.is_expired());
    }

    #[test]
    fn test_item_lookup_by_id() {
        let mut feed = Feed::new("t");
        feed.items.push(Item::new("2"));
        feed.items.push(Item::default());
        feed.items.push(Item::new("1"));
        assert_eq!(feed.item("1").and_then(|i| i.id.as_deref()), Some("1"));
        assert!(feed.item("3").is_none());
    }

    #[test]
    fn test_has_content() {
        let mut item = Item::new("1");
        assert!(!item.has_content());
        item.content_html = Some("<p>hi</p>".into());
        assert!(item.has_content());
    }

    #[test]
    fn test_hub_and_attachment_constructors() {
        let hub = Hub::new("WebSub", "https://hub.example.com/");
        assert_eq!(hub.hub_type.as_deref(), Some("WebSub"));

        let attachment = Attachment::new("https://example.com/ep1.mp3", "audio/mpeg");
        assert_eq!(attachment.mime_type.as_deref(), Some("audio/mpeg"));
        assert!(attachment.size_in_bytes.is_none());
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let rfc = parse_timestamp("2010-02-07T14:04:00-05:00").unwrap();
        assert_eq!(rfc.offset().local_minus_utc(), -5 * 3600);

        let basic = parse_timestamp("2010-02-07T14:04:00-0500").unwrap();
        assert_eq!(basic, rfc);

        let zulu = parse_timestamp("2010-02-07T19:04:00Z").unwrap();
        assert_eq!(zulu, rfc);

        let no_offset = parse_timestamp("2010-02-07T19:04:00").unwrap();
        assert_eq!(no_offset, rfc);

        let fractional = parse_timestamp("2010-02-07T19:04:00.250").unwrap();
        assert_eq!(fractional.timestamp_subsec_millis(), 250);

        let minutes = parse_timestamp("2010-02-07T19:04").unwrap();
        assert_eq!(minutes, rfc);

        let date_only = parse_timestamp("2024-01-01").unwrap();
        assert_eq!(date_only.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_timestamp_accessors() {
        let mut item = Item::new("1");
        assert!(item.published_at().is_none());

        let at = DateTime::parse_from_rfc3339("2014-05-09T14:04:00-07:00").unwrap();
        item.set_published_at(at);
        assert_eq!(item.date_published.as_deref(), Some("2014-05-09T14:04:00-07:00"));
        assert_eq!(item.published_at(), Some(at));

        item.date_modified = Some("not a date".into());
        assert!(item.modified_at().is_none());
        item.set_modified_at(at);
        assert_eq!(item.modified_at(), Some(at));
    }
}
