//! HTTP page fetching for dmhy.org
//!
//! [`PageFetcher`] is the seam the search session pulls pages through.
//! [`DmhyClient`] is the `reqwest` implementation used against the real
//! site; tests substitute canned pages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Proxy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DmhyError, Result};
use crate::url::BASE_URL;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Proxy URLs per scheme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy for `http://` requests
    pub http: Option<String>,
    /// Proxy for `https://` requests
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Build from the values of `http_proxy` and `https_proxy`
    ///
    /// Both must be set and non-empty, otherwise no proxy is used.
    pub fn from_vars(http: Option<String>, https: Option<String>) -> Option<Self> {
        match (http, https) {
            (Some(http), Some(https)) if !http.is_empty() && !https.is_empty() => Some(Self {
                http: Some(http),
                https: Some(https),
            }),
            _ => None,
        }
    }

    /// Read `http_proxy` / `https_proxy` from the environment
    pub fn from_env() -> Option<Self> {
        let proxy = Self::from_vars(
            std::env::var("http_proxy").ok(),
            std::env::var("https_proxy").ok(),
        );
        if proxy.is_none() {
            warn!("No system proxy found in http_proxy/https_proxy");
        }
        proxy
    }
}

/// Configuration for the HTTP client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Site root (default: https://dmhy.org)
    pub base_url: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Verify TLS certificates (default: true)
    pub verify_tls: bool,
    /// Explicit proxies
    pub proxy: Option<ProxyConfig>,
    /// Take proxies from `http_proxy` / `https_proxy`, overriding `proxy`
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: 30,
            verify_tls: true,
            proxy: None,
            use_system_proxy: false,
        }
    }
}

impl ClientConfig {
    /// The proxies this configuration resolves to
    pub fn resolve_proxy(&self) -> Option<ProxyConfig> {
        self.resolve_proxy_with(ProxyConfig::from_env)
    }

    /// Like [`resolve_proxy`](Self::resolve_proxy), with `system` standing
    /// in for the environment lookup
    pub fn resolve_proxy_with<S>(&self, system: S) -> Option<ProxyConfig>
    where
        S: FnOnce() -> Option<ProxyConfig>,
    {
        if self.use_system_proxy {
            system()
        } else {
            self.proxy.clone()
        }
    }
}

/// Source of raw listing pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the response body
    ///
    /// # Errors
    /// Returns `Network` if the request fails or the status is not 2xx
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Site root that page URLs are built against
    fn base_url(&self) -> &str {
        BASE_URL
    }
}

/// HTTP client for dmhy.org
///
/// One GET per call, no retries. Proxy and TLS behaviour come from
/// [`ClientConfig`].
pub struct DmhyClient {
    client: reqwest::Client,
    base_url: String,
}

impl DmhyClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// - `InvalidProxy` if a proxy URL is rejected
    /// - `Network` if the underlying client cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(!config.verify_tls);

        if !config.verify_tls {
            warn!("TLS certificate verification is disabled");
        }

        match config.resolve_proxy() {
            Some(proxy) => {
                if let Some(url) = proxy.http.as_deref() {
                    builder = builder.proxy(Proxy::http(url).map_err(|e| invalid_proxy(url, e))?);
                }
                if let Some(url) = proxy.https.as_deref() {
                    builder =
                        builder.proxy(Proxy::https(url).map_err(|e| invalid_proxy(url, e))?);
                }
            }
            None => builder = builder.no_proxy(),
        }

        let client = builder.build().map_err(DmhyError::Network)?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }
}

fn invalid_proxy(url: &str, source: reqwest::Error) -> DmhyError {
    DmhyError::InvalidProxy {
        url: url.to_string(),
        source,
    }
}

#[async_trait]
impl PageFetcher for DmhyClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        debug!(url, bytes = body.len(), "A request has been made");
        Ok(body.to_vec())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
