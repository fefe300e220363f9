//! Reverse proxy cache invalidation
//!
//! The edge proxy caches hostname -> tenant bindings. When a tenant moves to a
//! new hostname the old binding has to be evicted, which is done through the
//! proxy's admin API: `DELETE {PROXY_API_URL}/invalidate?hostname=...` with a
//! bearer token. Any 2xx is success.

use std::time::Duration;

use async_trait::async_trait;
use hostgate_shared::TenantError;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Errors from the invalidation call
#[derive(Debug, thiserror::Error)]
pub enum InvalidationError {
    #[error("Failed to reach proxy: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Proxy returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid proxy URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl From<InvalidationError> for TenantError {
    fn from(err: InvalidationError) -> Self {
        TenantError::CacheInvalidation(err.to_string())
    }
}

/// Evicts cached hostname bindings from the edge proxy
#[async_trait]
pub trait ProxyCacheInvalidator: Send + Sync {
    /// Drop any binding cached for `hostname`. Unknown hostnames are not an error.
    async fn invalidate(&self, hostname: &str) -> Result<(), InvalidationError>;
}

/// Invalidator talking to the proxy's admin API over HTTP
#[derive(Clone)]
pub struct HttpProxyInvalidator {
    client: Client,
    base_url: Url,
    auth_token: String,
}

impl HttpProxyInvalidator {
    /// Create a new invalidator for the proxy at `base_url`
    pub fn new(base_url: &str, auth_token: String, timeout: Duration) -> Result<Self, InvalidationError> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InvalidationError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            auth_token,
        })
    }

    /// Create from environment config, returns None if not configured
    pub fn from_config(
        proxy_api_url: Option<&str>,
        proxy_auth_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Option<Self>, InvalidationError> {
        match (proxy_api_url, proxy_auth_token) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => {
                Self::new(url, token.to_string(), timeout).map(Some)
            }
            _ => {
                warn!("Proxy API not configured - hostname changes will not evict proxy cache entries");
                Ok(None)
            }
        }
    }

    fn invalidate_url(&self, hostname: &str) -> Result<Url, InvalidationError> {
        let endpoint = format!("{}/invalidate", self.base_url.as_str().trim_end_matches('/'));
        Ok(Url::parse_with_params(&endpoint, &[("hostname", hostname)])?)
    }
}

#[async_trait]
impl ProxyCacheInvalidator for HttpProxyInvalidator {
    async fn invalidate(&self, hostname: &str) -> Result<(), InvalidationError> {
        let url = self.invalidate_url(hostname)?;

        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InvalidationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(hostname = %hostname, "Proxy cache entry invalidated");
        Ok(())
    }
}
