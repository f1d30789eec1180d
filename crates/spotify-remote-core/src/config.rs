//! Client configuration.
//!
//! Everything the client needs to know about where the service lives and
//! where the cached credential goes is carried in `ClientConfig`, which is
//! handed to `RemoteClient::connect`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::api::locator::{DEFAULT_PORT_END, DEFAULT_PORT_START};

/// Host the desktop client serves its control interface on.
/// Resolves to the loopback address.
pub const DEFAULT_BASE_URL: &str = "https://localhost.spotilocal.com";

/// Origin the service expects on anti-forgery and open requests.
pub const DEFAULT_ORIGIN: &str = "https://open.spotify.com";

/// Public endpoint issuing bearer tokens.
pub const DEFAULT_TOKEN_URL: &str = "http://open.spotify.com/token";

/// HTTP request timeout in seconds.
/// Generous enough for a busy desktop client while never hanging forever.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cached credential file name inside the cache root
const CREDENTIAL_FILE: &str = "spotify-remote.oauth";

/// Environment variable overriding the cache root
const CACHE_ROOT_ENV: &str = "XDG_CACHE_HOME";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host, without port
    pub base_url: String,
    pub port_start: u16,
    pub port_end: u16,
    pub origin: String,
    pub token_url: String,
    pub request_timeout: Duration,
    pub credential_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            port_start: DEFAULT_PORT_START,
            port_end: DEFAULT_PORT_END,
            origin: DEFAULT_ORIGIN.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            credential_path: PathBuf::from(CREDENTIAL_FILE),
        }
    }
}

impl ClientConfig {
    /// Default configuration with the credential path resolved from the
    /// environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            credential_path: Self::cache_root()?.join(CREDENTIAL_FILE),
            ..Self::default()
        })
    }

    /// `$XDG_CACHE_HOME` if set, else the platform cache directory, else
    /// `~/.cache`.
    pub fn cache_root() -> Result<PathBuf> {
        let from_env = std::env::var_os(CACHE_ROOT_ENV).filter(|v| !v.is_empty());
        Self::resolve_cache_root(from_env.map(PathBuf::from))
    }

    fn resolve_cache_root(from_env: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(root) = from_env {
            return Ok(root);
        }
        if let Some(root) = dirs::cache_dir() {
            return Ok(root);
        }
        dirs::home_dir()
            .map(|home| home.join(".cache"))
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))
    }

    pub fn url(&self, port: u16, path: &str) -> String {
        format!("{}:{}{}", self.base_url, port, path)
    }
}
