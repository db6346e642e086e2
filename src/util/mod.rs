//! Helpers shared by the fetchers and the command-line tool.
//!
//! - **URL handling**: scheme and host checks before fetching, link resolution
//! - **Text**: terminal-safe rendering of untrusted feed strings

mod text;
mod url_validator;

pub use text::{display_width, sanitize_line, truncate_to_width};
pub use url_validator::{is_remote, resolve_link, validate_feed_url, UrlValidationError};
