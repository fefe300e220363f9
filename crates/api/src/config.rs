//! Application configuration

use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub public_domain: String, // e.g., "example.com" for *.example.com tenants
    pub log_format: LogFormat,

    // Routing
    pub allow_foreign_hostname_mapping: bool,

    // Database
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Reverse proxy admin API
    pub proxy_api_url: Option<String>,
    pub proxy_auth_token: Option<String>,
    pub proxy_request_timeout_ms: u64,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let proxy_api_url = non_empty_var("PROXY_API_URL");
        let proxy_auth_token = non_empty_var("PROXY_AUTH_TOKEN");
        if proxy_api_url.is_some() && proxy_auth_token.is_none() {
            return Err(ConfigError::Missing("PROXY_AUTH_TOKEN"));
        }

        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            public_domain: parse_public_domain(
                &env::var("PUBLIC_DOMAIN").unwrap_or_else(|_| "localhost".to_string()),
            )?,
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },

            // Routing
            allow_foreign_hostname_mapping: env::var("ALLOW_FOREIGN_HOSTNAME_MAPPING")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("ALLOW_FOREIGN_HOSTNAME_MAPPING must be true or false"))?,

            // Database
            database_url: non_empty_var("DATABASE_URL"),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            // Reverse proxy
            proxy_api_url,
            proxy_auth_token,
            proxy_request_timeout_ms: env::var("PROXY_REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
        })
    }

    pub fn proxy_request_timeout(&self) -> Duration {
        Duration::from_millis(self.proxy_request_timeout_ms)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// The public domain is matched exactly against request hostnames, so it must
/// be a bare lowercase host
fn parse_public_domain(raw: &str) -> Result<String, ConfigError> {
    let domain = raw.trim().trim_end_matches('.').to_lowercase();
    if domain.is_empty() {
        return Err(ConfigError::Invalid("PUBLIC_DOMAIN must not be empty"));
    }
    if domain.contains("://") || domain.contains('/') {
        return Err(ConfigError::Invalid("PUBLIC_DOMAIN must not contain a scheme or path"));
    }
    if domain.contains(':') {
        return Err(ConfigError::Invalid("PUBLIC_DOMAIN must not contain a port"));
    }
    Ok(domain)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
