//! Stateless HTTP request builder and response parser for the catalog API.
//!
//! # Design
//! `CatalogClient` holds only its base URL and default headers and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. The round-trip itself happens elsewhere: in the async
//! `Fetcher`, in a test, or in a C host.
//!
//! Status handling is checked before any decoding, so a failed response is
//! never partially decoded. A body that is not JSON is a `Decode` error; once
//! the body is JSON, record-level problems are absorbed by `decode`.

use tracing::{debug, warn};
use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::decode::{decode_page, decode_product};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Product, ProductPage};

/// `limit=0` asks the provider for every product in one page.
pub const NO_LIMIT: u32 = 0;

/// Synchronous, stateless client for the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    headers: Vec<(String, String)>,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        headers.extend(config.headers.iter().cloned());
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_product(&self, id: i64) -> HttpRequest {
        self.get(format!("/products/{id}"))
    }

    pub fn build_list_products(&self, limit: u32, skip: u32) -> HttpRequest {
        self.get(format!("/products?{}", paging(limit, skip)))
    }

    pub fn build_all_products(&self) -> HttpRequest {
        self.build_list_products(NO_LIMIT, 0)
    }

    /// The query is sent as given, including when it is empty; the provider
    /// decides what an empty search returns.
    pub fn build_search_products(&self, query: &str, limit: u32, skip: u32) -> HttpRequest {
        let q: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .finish();
        self.get(format!("/products/search?{q}&{}", paging(limit, skip)))
    }

    pub fn build_products_by_category(&self, category: &str, limit: u32, skip: u32) -> HttpRequest {
        self.get(format!(
            "/products/category/{}?{}",
            encode_segment(category),
            paging(limit, skip)
        ))
    }

    /// Parse a by-id response. A 404 becomes `ApiError::NotFound`.
    pub fn parse_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        if response.status == 404 {
            return Err(ApiError::NotFound);
        }
        check_status(&response)?;
        let raw = parse_json(&response.body)?;
        if !raw.is_object() {
            return Err(ApiError::Decode("expected a JSON object".to_string()));
        }
        Ok(decode_product(&raw))
    }

    /// Parse a list, search or category response into its page envelope.
    pub fn parse_product_page(&self, response: HttpResponse) -> Result<ProductPage, ApiError> {
        check_status(&response)?;
        let raw = parse_json(&response.body)?;
        let page = decode_page(&raw).map_err(ApiError::Decode)?;
        debug!(
            count = page.products.len(),
            total = page.total,
            skip = page.skip,
            "decoded product page"
        );
        Ok(page)
    }

    /// Like `parse_product_page`, keeping only the products.
    pub fn parse_products(&self, response: HttpResponse) -> Result<Vec<Product>, ApiError> {
        self.parse_product_page(response).map(|page| page.products)
    }

    fn get(&self, path_and_query: String) -> HttpRequest {
        let path = format!("{}{path_and_query}", self.base_url);
        debug!(method = HttpMethod::Get.as_str(), %path, "built request");
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: self.headers.clone(),
        }
    }
}

fn paging(limit: u32, skip: u32) -> String {
    format!("limit={limit}&skip={skip}")
}

/// Percent-encode one path segment.
fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Map non-success status codes to `ApiError::Transport`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    warn!(status = response.status, "catalog request failed");
    Err(ApiError::http(response.status, response.body.clone()))
}

fn parse_json(body: &str) -> Result<serde_json::Value, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}
