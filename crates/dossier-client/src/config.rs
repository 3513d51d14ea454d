//! Client configuration.
//!
//! Supports overriding the service location through the `DOSSIER_API_URL`
//! environment variable; everything else is compiled-in defaults.

use std::env;

/// Where the assistant service listens when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the assistant service, without a trailing slash.
    pub base_url: String,
}

impl ClientConfig {
    /// Creates a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Loads the configuration from environment variables.
    ///
    /// `DOSSIER_API_URL` overrides the base URL; the default is
    /// [`DEFAULT_API_URL`].
    pub fn from_env() -> Self {
        let base_url = env::var("DOSSIER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = ClientConfig::new("http://localhost:8000/");
        assert_eq!(config.base_url, "http://localhost:8000");
    }
}
