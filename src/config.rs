//! Fetcher configuration, optionally loaded from a TOML file.
//!
//! The file is optional: a missing or empty file yields `FetcherConfig::default()`.
//! Unknown keys are ignored by serde, though a warning is logged for each one
//! so typos do not go unnoticed.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Settings for the bundled fetch collaborators.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Per-request timeout in seconds, covering connect and headers.
    pub timeout_secs: u64,

    /// Largest response body accepted, in bytes.
    pub max_body_bytes: usize,

    /// User-Agent header sent with HTTP requests.
    pub user_agent: String,

    /// Permit `localhost` and private-range addresses. Off by default so a
    /// feed cannot point the fetcher at internal services.
    pub allow_private_hosts: bool,

    /// Upper bound on pages visited when following `next_url`.
    pub max_pages: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_body_bytes: 10 * 1024 * 1024,
            user_agent: concat!("jsonfeed/", env!("CARGO_PKG_VERSION")).to_string(),
            allow_private_hosts: false,
            max_pages: 10,
        }
    }
}

impl FetcherConfig {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "timeout_secs",
        "max_body_bytes",
        "user_agent",
        "allow_private_hosts",
        "max_pages",
    ];

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(FetcherConfig::default())`
    /// - Empty file → `Ok(FetcherConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text. Blank text yields the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Self = toml::from_str(content)?;
        tracing::info!(
            timeout_secs = config.timeout_secs,
            max_body_bytes = config.max_body_bytes,
            allow_private_hosts = config.allow_private_hosts,
            "Loaded fetcher configuration"
        );
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
