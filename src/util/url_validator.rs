use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use thiserror::Error;
use url::{Host, Url};

/// Errors that can occur during URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL points to a private/internal IP address.
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    /// The URL points to localhost.
    #[error("Localhost not allowed")]
    Localhost,
}

/// Validates a URL before it is handed to the HTTP fetcher.
///
/// Only `http` and `https` are accepted. Unless `allow_private_hosts` is set,
/// localhost and private, link-local and unspecified addresses are rejected
/// so that a feed's `next_url` cannot steer requests at internal services.
///
/// # Examples
///
/// ```
/// use jsonfeed::util::validate_feed_url;
///
/// let url = validate_feed_url("https://example.com/feed.json", false).unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_feed_url("http://localhost/feed.json", false).is_err());
/// assert!(validate_feed_url("http://localhost/feed.json", true).is_ok());
/// assert!(validate_feed_url("file:///etc/passwd", true).is_err());
/// ```
pub fn validate_feed_url(url_str: &str, allow_private_hosts: bool) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if allow_private_hosts {
        return Ok(url);
    }

    let ip = match url.host() {
        Some(Host::Domain(name)) if name.eq_ignore_ascii_case("localhost") => {
            return Err(UrlValidationError::Localhost)
        }
        Some(Host::Ipv4(v4)) => IpAddr::V4(v4),
        Some(Host::Ipv6(v6)) => IpAddr::V6(v6),
        _ => return Ok(url),
    };

    if ip.is_loopback() {
        Err(UrlValidationError::Localhost)
    } else if is_internal_address(ip) {
        Err(UrlValidationError::PrivateIp(ip.to_string()))
    } else {
        Ok(url)
    }
}

/// Resolves a possibly relative link (such as `next_url`) against the
/// location of the document it appeared in.
///
/// A URL base uses normal URL joining. Any other base is taken as a file
/// path, and the link is placed next to that file. Links that are already
/// absolute URLs or absolute paths come back unchanged.
pub fn resolve_link(base: &str, link: &str) -> String {
    if let Ok(base_url) = Url::parse(base) {
        return base_url
            .join(link)
            .map(String::from)
            .unwrap_or_else(|_| link.to_string());
    }

    if Url::parse(link).is_ok() || Path::new(link).is_absolute() {
        return link.to_string();
    }

    match Path::new(base).parent() {
        Some(dir) => dir.join(link).to_string_lossy().into_owned(),
        None => link.to_string(),
    }
}

/// Whether a source string names a remote http(s) resource rather than a
/// local file.
pub fn is_remote(source: &str) -> bool {
    Url::parse(source)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Addresses a public feed has no business pointing at. IPv4-mapped IPv6
/// addresses are judged by the IPv4 address they carry.
fn is_internal_address(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_internal_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_internal_v4(v4),
            None => {
                v6.is_loopback()
                    || v6.is_unspecified()
                    // fc00::/7 unique local, fe80::/10 link local
                    || matches!(v6.segments()[0], 0xfc00..=0xfdff | 0xfe80..=0xfebf)
            }
        },
    }
}

fn is_internal_v4(v4: Ipv4Addr) -> bool {
    let [first, second, ..] = v4.octets();
    v4.is_private()
        || v4.is_loopback()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_broadcast()
        // 100.64.0.0/10 carrier-grade NAT
        || (first == 100 && (second & 0xc0) == 64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(url: &str) -> bool {
        validate_feed_url(url, false).is_err()
    }

    #[test]
    fn test_public_hosts_pass() {
        let url = validate_feed_url("https://example.com/feed.json", false).unwrap();
        assert_eq!(url.path(), "/feed.json");
        assert!(!rejected("http://news.example.org"));
        assert!(!rejected("http://93.184.216.34/feed.json"));
        assert!(!rejected("http://[2606:2800:220:1::]/feed.json"));
    }

    #[test]
    fn test_only_http_schemes() {
        for url in ["file:///etc/passwd", "ftp://example.com/feed.json", "gopher://example.com"] {
            match validate_feed_url(url, true) {
                Err(UrlValidationError::UnsupportedScheme(_)) => {}
                other => panic!("{url}: expected UnsupportedScheme, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_unparseable_url() {
        assert!(matches!(
            validate_feed_url("not a url", false),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_loopback_reported_as_localhost() {
        for url in ["http://localhost/feed", "http://LOCALHOST:8080/", "http://127.0.0.1/", "http://[::1]/"] {
            assert!(
                matches!(validate_feed_url(url, false), Err(UrlValidationError::Localhost)),
                "{url}"
            );
        }
        assert!(validate_feed_url("http://127.0.0.1:8080/feed", true).is_ok());
    }

    #[test]
    fn test_internal_ranges_rejected() {
        let internal = [
            "http://10.0.0.1:3000/feed",
            "http://172.16.0.1/feed",
            "http://192.168.1.1/feed",
            "http://169.254.169.254/latest/meta-data",
            "http://100.64.0.1/feed",
            "http://0.0.0.0/feed",
            "http://255.255.255.255/feed",
            "http://[fd12:3456::1]/feed",
            "http://[fe80::1]/feed",
            "http://[::ffff:192.168.0.1]/feed",
        ];
        for url in internal {
            assert!(rejected(url), "{url} should be rejected");
        }
    }

    #[test]
    fn test_resolve_against_url() {
        assert_eq!(
            resolve_link("https://example.org/feed.json", "feed.json?page=2"),
            "https://example.org/feed.json?page=2"
        );
        assert_eq!(
            resolve_link("https://example.org/feeds/a.json", "/b.json"),
            "https://example.org/b.json"
        );
        assert_eq!(
            resolve_link("https://example.org/feed.json", "https://cdn.example.org/p2.json"),
            "https://cdn.example.org/p2.json"
        );
        assert_eq!(
            resolve_link("file:///srv/feeds/page1.json", "page2.json"),
            "file:///srv/feeds/page2.json"
        );
    }

    #[test]
    fn test_resolve_against_file_path() {
        assert_eq!(resolve_link("./local.json", "page2.json"), "./page2.json");
        assert_eq!(
            resolve_link("/srv/feeds/page1.json", "page2.json"),
            "/srv/feeds/page2.json"
        );
        assert_eq!(resolve_link("feeds/page1.json", "../other.json"), "feeds/../other.json");
        assert_eq!(resolve_link("page1.json", "page2.json"), "page2.json");
        assert_eq!(resolve_link("/srv/feeds/page1.json", "/tmp/p2.json"), "/tmp/p2.json");
        assert_eq!(
            resolve_link("/srv/feeds/page1.json", "https://example.org/p2.json"),
            "https://example.org/p2.json"
        );
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/feed.json"));
        assert!(!is_remote("./feed.json"));
        assert!(!is_remote("file:///tmp/feed.json"));
    }
}
