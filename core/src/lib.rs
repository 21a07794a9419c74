//! Client core for a product-catalog web API.
//!
//! # Overview
//! Fetches product records (by id, by page, by search query, by category)
//! and decodes them into typed models. Decoding is total: malformed or
//! missing fields fall back to defaults instead of failing the request.
//!
//! # Design
//! - `CatalogClient` is stateless and does no I/O: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `Fetcher` adds the async round-trip through a `Transport`
//!   (`ReqwestTransport` in production), one request per operation.
//! - `decode` maps `serde_json::Value` into `Product` using the table in
//!   `defaults`; field anomalies are logged via `tracing`, never raised.
//! - Models use owned `String` / `Vec` fields so the FFI crate can copy them
//!   out without lifetimes.

pub mod client;
pub mod config;
pub mod decode;
pub mod defaults;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod transport;
pub mod types;

pub use client::CatalogClient;
pub use config::ClientConfig;
pub use decode::{decode_product, decode_product_with_report, DecodeReport, FieldAnomaly};
pub use error::ApiError;
pub use fetcher::{with_cancellation, Fetcher};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Dimensions, Product, ProductPage, Review};
