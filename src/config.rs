// Client configuration
// Static data: base URL, refresh path, route table, safe locations

use anyhow::{Context, Result};

use crate::endpoints::RouteTable;
use crate::redirect::RedirectPolicy;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Static client configuration. The classification table and the safe
/// redirect locations are configuration data, never derived at runtime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin plus path prefix, no trailing slash.
    pub base_url: String,

    /// Refresh endpoint path, invoked with no body on ambient credentials.
    pub refresh_path: String,

    /// Endpoint classification table.
    pub routes: RouteTable,

    /// Navigation fallback policy for unrecoverable auth failures.
    pub redirect: RedirectPolicy,

    /// Connection timeout in seconds.
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds.
    pub request_timeout: u64,
}

impl ClientConfig {
    /// Load configuration from the environment with defaults for every
    /// value. A `.env` file is honored if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("STOREFRONT_API_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        reqwest::Url::parse(&base_url).context("STOREFRONT_API_URL is not a valid URL")?;

        let mut config = Self::with_base_url(base_url);

        config.connect_timeout = std::env::var("STOREFRONT_CONNECT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(config.connect_timeout);

        config.request_timeout = std::env::var("STOREFRONT_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(config.request_timeout);

        Ok(config)
    }

    /// Configuration with the storefront defaults and an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            routes: RouteTable::storefront(),
            redirect: RedirectPolicy::storefront(),
            connect_timeout: 10,
            request_timeout: 30,
        }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn refresh_url(&self) -> String {
        self.api_url(&self.refresh_path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}
