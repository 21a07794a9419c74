//! Executes `HttpRequest` values over the network.
//!
//! The `Transport` trait is the only place the core touches I/O. It returns
//! any HTTP response as data, whatever its status, and reserves `Err` for
//! failures that produced no response at all (DNS, connect, timeout).
//! Interpreting status codes is left to `CatalogClient`.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `reqwest`-backed transport. Dropping the returned future aborts the
/// in-flight request.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::connection(format!("client setup failed: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.path),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.text().await.map_err(map_transport_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_builder() {
        return ApiError::Serialization(error.to_string());
    }
    let message = if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    };
    ApiError::Transport {
        status: error.status().map(|s| s.as_u16()),
        message,
        body: String::new(),
    }
}
