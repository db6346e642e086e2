use crate::feed::fetcher::{load_from_uri, FetchText, LoadError};
use crate::feed::model::Feed;
use crate::util::resolve_link;
use std::collections::HashSet;

/// Loads `first_uri` and then follows `next_url` links, returning the pages
/// in the order visited.
///
/// The walk ends when a page has no `next_url`, when `max_pages` pages have
/// been loaded, or when a `next_url` would revisit the chain: one equal to
/// the page's own `feed_url`, or to any URI already loaded. Relative links
/// are resolved against the URI of the page they appear on.
///
/// # Errors
///
/// The first fetch or parse failure is returned as-is; pages loaded before
/// it are discarded.
pub async fn follow_pages<F: FetchText>(
    first_uri: &str,
    fetcher: &F,
    max_pages: usize,
) -> Result<Vec<Feed>, LoadError> {
    let mut pages = Vec::new();
    let mut seen = HashSet::new();
    let mut current = first_uri.to_string();

    while pages.len() < max_pages {
        seen.insert(current.clone());
        let feed = load_from_uri(&current, fetcher).await?;
        let next = next_page(&feed, &current, &seen);
        pages.push(feed);

        match next {
            Some(uri) => current = uri,
            None => break,
        }
    }

    tracing::debug!(first = %first_uri, pages = pages.len(), "Pagination walk finished");
    Ok(pages)
}

fn next_page(feed: &Feed, current: &str, seen: &HashSet<String>) -> Option<String> {
    let next = resolve_link(current, feed.next_url.as_deref()?);

    let own_url = feed.feed_url.as_deref().map(|u| resolve_link(current, u));
    if own_url.as_deref() == Some(next.as_str()) {
        tracing::warn!(page = %current, next = %next, "next_url points back at the feed itself");
        return None;
    }

    if seen.contains(&next) {
        tracing::warn!(page = %current, next = %next, "next_url repeats an earlier page");
        return None;
    }

    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::fetcher::FetchError;
    use crate::feed::parser::serialize;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned pages from memory and records every request.
    #[derive(Default)]
    struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn with_page(mut self, uri: &str, feed_url: Option<&str>, next_url: Option<&str>) -> Self {
            let mut feed = Feed::new(uri);
            feed.feed_url = feed_url.map(String::from);
            feed.next_url = next_url.map(String::from);
            self.pages.insert(uri.to_string(), serialize(&feed));
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl FetchText for StaticFetcher {
        async fn fetch_text(&self, uri: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(uri.to_string());
            self.pages
                .get(uri)
                .cloned()
                .ok_or(FetchError::HttpStatus(404))
        }
    }

    const P1: &str = "https://example.org/feed.json";
    const P2: &str = "https://example.org/feed.json?page=2";
    const P3: &str = "https://example.org/feed.json?page=3";

    #[tokio::test]
    async fn test_follows_chain_to_end() {
        let fetcher = StaticFetcher::default()
            .with_page(P1, Some(P1), Some(P2))
            .with_page(P2, Some(P1), Some(P3))
            .with_page(P3, Some(P1), None);

        let pages = follow_pages(P1, &fetcher, 10).await.unwrap();
        let titles: Vec<&str> = pages.iter().filter_map(|f| f.title.as_deref()).collect();
        assert_eq!(titles, vec![P1, P2, P3]);
    }

    #[tokio::test]
    async fn test_stops_at_max_pages() {
        let fetcher = StaticFetcher::default()
            .with_page(P1, None, Some(P2))
            .with_page(P2, None, Some(P3))
            .with_page(P3, None, None);

        let pages = follow_pages(P1, &fetcher, 2).await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(fetcher.requests(), vec![P1.to_string(), P2.to_string()]);
    }

    #[tokio::test]
    async fn test_zero_max_pages_fetches_nothing() {
        let fetcher = StaticFetcher::default().with_page(P1, None, None);
        let pages = follow_pages(P1, &fetcher, 0).await.unwrap();
        assert!(pages.is_empty());
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_next_url_equal_to_feed_url_stops() {
        let fetcher = StaticFetcher::default().with_page(P1, Some(P2), Some(P2));
        let pages = follow_pages(P1, &fetcher, 10).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_stops() {
        let fetcher = StaticFetcher::default()
            .with_page(P1, None, Some(P2))
            .with_page(P2, None, Some(P1));

        let pages = follow_pages(P1, &fetcher, 10).await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(fetcher.requests(), vec![P1.to_string(), P2.to_string()]);
    }

    #[tokio::test]
    async fn test_relative_next_url_resolved() {
        let fetcher = StaticFetcher::default()
            .with_page(P1, None, Some("feed.json?page=2"))
            .with_page(P2, None, None);

        let pages = follow_pages(P1, &fetcher, 10).await.unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[tokio::test]
    async fn test_relative_next_url_beside_local_file() {
        let fetcher = StaticFetcher::default()
            .with_page("/srv/feeds/page1.json", None, Some("page2.json"))
            .with_page("/srv/feeds/page2.json", None, None);

        let pages = follow_pages("/srv/feeds/page1.json", &fetcher, 10).await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(
            fetcher.requests(),
            vec!["/srv/feeds/page1.json".to_string(), "/srv/feeds/page2.json".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_page_propagates() {
        let fetcher = StaticFetcher::default().with_page(P1, None, Some(P2));
        match follow_pages(P1, &fetcher, 10).await {
            Err(LoadError::Fetch(FetchError::HttpStatus(404))) => {}
            other => panic!("Expected Fetch error, got {:?}", other),
        }
    }
}
