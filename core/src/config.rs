//! Client configuration.
//!
//! Plain data with serde support so hosts can load it from whatever config
//! source they already use. The core itself never reads the environment.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";
pub const DEFAULT_PAGE_SIZE: u32 = 30;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_USER_AGENT: &str = concat!("catalog-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Whole-request timeout applied by the transport.
    #[serde(with = "millis")]
    pub timeout: Duration,
    pub user_agent: String,
    /// Page size for operations that do not take an explicit limit.
    pub default_page_size: u32,
    /// Sent with every request, after `Accept: application/json`.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
