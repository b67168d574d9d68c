//! Client configuration
//!
//! The only setting is the analysis backend's base URL.

use audit_types::Endpoint;
use url::Url;

use crate::error::{ClientError, Result};

pub const BACKEND_URL_ENV: &str = "CYBERSTRIKE_BACKEND_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash
    pub backend_url: String,
}

impl ClientConfig {
    /// Validate and normalize a backend base URL
    pub fn new(backend_url: &str) -> Result<Self> {
        let trimmed = backend_url.trim();
        if trimmed.is_empty() {
            return Err(ClientError::Config("backend URL is empty".to_string()));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| ClientError::Config(format!("invalid backend URL {}: {}", trimmed, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "backend URL must be http(s): {}",
                trimmed
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ClientError::Config(format!(
                "backend URL has no host: {}",
                trimmed
            )));
        }
        // Endpoint paths are appended to the base
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ClientError::Config(format!(
                "backend URL cannot carry a query or fragment: {}",
                trimmed
            )));
        }

        Ok(Self {
            backend_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Load from `CYBERSTRIKE_BACKEND_URL`, defaulting to a local backend
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var(BACKEND_URL_ENV).unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        Self::new(&url)
    }

    pub fn endpoint_url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.backend_url, endpoint.path())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}
