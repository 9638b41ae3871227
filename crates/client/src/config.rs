//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - root every HTTP endpoint is joined onto (default: `http://localhost:4000`)
//! - `PUSH_URL` - socket.io websocket URL (default: derived from `API_BASE_URL`)
//! - `CREDENTIALS_PATH` - where the auth token is kept (default: `.storefront/credentials.json`)
//! - `FEED_CAPACITY` - push batches buffered per subscriber (default: 256)
//! - `METRICS_ADDR` - Prometheus listener address (default: disabled)
//! - `RUST_LOG` - tracing filter directive (default: `info`)

use std::net::SocketAddr;
use std::path::PathBuf;

use catalog::DEFAULT_FEED_CAPACITY;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_CREDENTIALS_PATH: &str = ".storefront/credentials.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the storefront API, always ending in `/`
    pub api_base_url: Url,
    /// socket.io websocket endpoint
    pub push_url: Url,
    pub credentials_path: PathBuf,
    pub feed_capacity: usize,
    pub metrics_addr: Option<SocketAddr>,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from the environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(
            "API_BASE_URL",
            &lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        )?;

        let push_url = match lookup("PUSH_URL") {
            Some(raw) => Url::parse(&raw)
                .map_err(|e| ConfigError::InvalidEnvVar("PUSH_URL".to_string(), e.to_string()))?,
            None => derive_push_url(&api_base_url)?,
        };

        let feed_capacity = match lookup("FEED_CAPACITY") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "FEED_CAPACITY".to_string(),
                        format!("expected a positive integer, got {raw:?}"),
                    )
                })?,
            None => DEFAULT_FEED_CAPACITY,
        };

        let metrics_addr = lookup("METRICS_ADDR")
            .map(|raw| {
                raw.parse::<SocketAddr>().map_err(|e| {
                    ConfigError::InvalidEnvVar("METRICS_ADDR".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            api_base_url,
            push_url,
            credentials_path: lookup("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            feed_capacity,
            metrics_addr,
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        match Self::from_lookup(|_| None) {
            Ok(config) => config,
            Err(e) => unreachable!("built-in defaults are valid: {e}"),
        }
    }
}

/// Parses a base URL and makes sure relative paths join below it.
pub fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Maps the API base URL onto the socket.io websocket endpoint.
pub fn derive_push_url(api_base_url: &Url) -> Result<Url, ConfigError> {
    let mut url = api_base_url.clone();
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme).map_err(|()| {
        ConfigError::InvalidEnvVar(
            "API_BASE_URL".to_string(),
            "cannot derive a websocket URL".to_string(),
        )
    })?;
    url.set_path("/socket.io/");
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}
