use crate::config::FetcherConfig;
use crate::feed::model::Feed;
use crate::feed::parser::{parse, ParseError};
use crate::util::{validate_feed_url, UrlValidationError};
use futures::stream::StreamExt;
use std::future::Future;
use thiserror::Error;

const ACCEPT_FEED: &str = "application/feed+json, application/json;q=0.9, */*;q=0.1";

/// Errors raised while obtaining feed text.
///
/// These belong to the transport. They never describe the document itself:
/// a body that arrives intact but is not a feed is a [`ParseError`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL was rejected before any request was made
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Body was not UTF-8
    #[error("Response is not valid UTF-8")]
    InvalidEncoding,
    /// Local file could not be read
    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of [`load_from_uri`]: either the fetch or the parse went wrong,
/// never both.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Capability to obtain the text of a feed from a location.
///
/// This is the only way the crate reaches outside memory. Implementations
/// decide what a location means (an HTTP URL, a file path, a test fixture).
/// The returned future can be dropped at any point to cancel the fetch.
pub trait FetchText {
    fn fetch_text(&self, uri: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches `uri` with `fetcher` and parses the result.
///
/// Parsing only happens after a successful fetch; a transport failure is
/// reported as [`LoadError::Fetch`] and never as a parse error.
pub async fn load_from_uri<F: FetchText>(uri: &str, fetcher: &F) -> Result<Feed, LoadError> {
    let text = fetcher.fetch_text(uri).await?;
    Ok(parse(&text)?)
}

/// HTTP collaborator backed by `reqwest`.
///
/// Makes a single GET per call: no retry, no backoff, no caching. The
/// client is cheap to clone and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    /// Builds a fetcher with its own client configured from `config`.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, config })
    }

    /// Builds a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client, config: FetcherConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }
}

impl FetchText for HttpFetcher {
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] - Unsupported scheme or blocked host
    /// - [`FetchError::Network`] - Connection or TLS errors
    /// - [`FetchError::Timeout`] - No response within the configured timeout
    /// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
    /// - [`FetchError::ResponseTooLarge`] - Body over `max_body_bytes`
    /// - [`FetchError::IncompleteResponse`] - Body shorter than Content-Length
    /// - [`FetchError::InvalidEncoding`] - Body is not UTF-8
    async fn fetch_text(&self, uri: &str) -> Result<String, FetchError> {
        let url = validate_feed_url(uri, self.config.allow_private_hosts)?;

        let response = tokio::time::timeout(
            self.config.timeout(),
            self.client
                .get(url.clone())
                .header(reqwest::header::ACCEPT, ACCEPT_FEED)
                .send(),
        )
        .await
        .map_err(|_| FetchError::Timeout)??;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "Feed request rejected");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let bytes = tokio::time::timeout(
            self.config.timeout(),
            read_limited_bytes(response, self.config.max_body_bytes),
        )
        .await
        .map_err(|_| FetchError::Timeout)??;

        tracing::debug!(url = %url, bytes = bytes.len(), "Fetched feed");
        String::from_utf8(bytes).map_err(|_| FetchError::InvalidEncoding)
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

/// Local-file collaborator. Accepts plain paths and `file://` URLs.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    max_body_bytes: usize,
}

impl FileFetcher {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Default for FileFetcher {
    fn default() -> Self {
        Self::new(&FetcherConfig::default())
    }
}

impl FetchText for FileFetcher {
    async fn fetch_text(&self, uri: &str) -> Result<String, FetchError> {
        let path = uri.strip_prefix("file://").unwrap_or(uri);

        let meta = tokio::fs::metadata(path).await?;
        if meta.len() > self.max_body_bytes as u64 {
            return Err(FetchError::ResponseTooLarge);
        }

        let bytes = tokio::fs::read(path).await?;
        tracing::debug!(path = %path, bytes = bytes.len(), "Read feed file");
        String::from_utf8(bytes).map_err(|_| FetchError::InvalidEncoding)
    }
}
