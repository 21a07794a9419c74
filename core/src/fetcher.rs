//! Async catalog operations: build, execute, parse.
//!
//! # Design
//! `Fetcher` pairs a `CatalogClient` with a `Transport`. Every operation is
//! exactly one request; nothing is retried, cached, or paged through on the
//! caller's behalf. Calls share no mutable state, so a `Fetcher` can be used
//! from many tasks at once and results may complete in any order.
//!
//! Cancellation is cooperative: `with_cancellation` races any operation
//! against a `CancellationToken` and drops the losing future, which aborts
//! the request inside the transport.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::CatalogClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Product, ProductPage};

pub struct Fetcher<T: Transport> {
    client: CatalogClient,
    transport: T,
    page_size: u32,
}

impl Fetcher<ReqwestTransport> {
    /// Fetcher over HTTP with the given configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: CatalogClient::from_config(config),
            transport,
            page_size: config.default_page_size,
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, ApiError> {
        let response = self.transport.execute(self.client.build_get_product(id)).await?;
        self.client.parse_product(response)
    }

    pub async fn get_products(&self, limit: u32, skip: u32) -> Result<Vec<Product>, ApiError> {
        self.get_products_page(limit, skip).await.map(|page| page.products)
    }

    pub async fn get_products_page(&self, limit: u32, skip: u32) -> Result<ProductPage, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_list_products(limit, skip))
            .await?;
        self.client.parse_product_page(response)
    }

    /// Every product in a single unbounded page request.
    pub async fn get_all_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self.transport.execute(self.client.build_all_products()).await?;
        self.client.parse_products(response)
    }

    /// First page of search results at the configured page size.
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        self.search_products_page(query, self.page_size, 0)
            .await
            .map(|page| page.products)
    }

    pub async fn search_products_page(
        &self,
        query: &str,
        limit: u32,
        skip: u32,
    ) -> Result<ProductPage, ApiError> {
        debug!(query, limit, skip, "searching products");
        let response = self
            .transport
            .execute(self.client.build_search_products(query, limit, skip))
            .await?;
        self.client.parse_product_page(response)
    }

    pub async fn get_products_by_category(
        &self,
        category: &str,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<Product>, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_products_by_category(category, limit, skip))
            .await?;
        self.client.parse_products(response)
    }
}

/// Run `operation` until it completes or `token` is cancelled.
///
/// On cancellation the operation future is dropped before it resolves and
/// `ApiError::Cancelled` is returned.
pub async fn with_cancellation<F, R>(token: &CancellationToken, operation: F) -> Result<R, ApiError>
where
    F: Future<Output = Result<R, ApiError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!("catalog request cancelled");
            Err(ApiError::Cancelled)
        }
        result = operation => result,
    }
}
