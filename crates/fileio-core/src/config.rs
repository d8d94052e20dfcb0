//! Configuration module

use std::env;

const DEFAULT_BASE_URL: &str = "https://file.io";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client configuration. The service is anonymous, so there is no
/// credential to configure; only the endpoint and the transport timeout.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Build from environment: FILEIO_BASE_URL and FILEIO_TIMEOUT_SECS,
    /// falling back to defaults.
    pub fn from_env() -> Self {
        let base_url =
            env::var("FILEIO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("FILEIO_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..ClientConfig::default()
        }
    }
}
