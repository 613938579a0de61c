//! Backend endpoint abstraction.
//!
//! An endpoint is a base URL and nothing else. Identity is the string.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::config::ConfigError;

/// One backend's base address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    base: Arc<str>,
}

impl Endpoint {
    /// Parse and normalize a base URL.
    ///
    /// A single trailing `/` is dropped so that joining with a request path
    /// never doubles the slash.
    pub fn parse(host: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidEndpoint {
            host: host.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = host.trim();
        let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("base URL must not carry a query or fragment"));
        }

        let base = trimmed.strip_suffix('/').unwrap_or(trimmed);
        Ok(Self { base: Arc::from(base) })
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Target URL for a request: base joined with the path and query as-is.
    pub fn join(&self, path_and_query: &str) -> String {
        let mut target = String::with_capacity(self.base.len() + path_and_query.len());
        target.push_str(&self.base);
        if !path_and_query.starts_with('/') {
            target.push('/');
        }
        target.push_str(path_and_query);
        target
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}
