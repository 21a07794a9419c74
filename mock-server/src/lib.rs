use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Bundled catalog served by `run`. Product 12 is intentionally drifted
/// (string numbers, non-object dimensions, a non-object review).
const FIXTURE: &str = include_str!("../data/products.json");

const DEFAULT_LIMIT: usize = 30;

/// Raw records, served exactly as stored.
pub type Catalog = Arc<Vec<Value>>;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

/// List envelope. `limit` is the number of products actually returned.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductsPage {
    pub products: Vec<Value>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

pub fn fixture() -> Result<Vec<Value>, serde_json::Error> {
    serde_json::from_str(FIXTURE)
}

pub fn app(products: Vec<Value>) -> Router {
    let catalog: Catalog = Arc::new(products);
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        .route("/products/category/{category}", get(products_by_category))
        .route("/products/{id}", get(get_product))
        .with_state(catalog)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let products = fixture().map_err(std::io::Error::other)?;
    tracing::info!(count = products.len(), "serving catalog");
    axum::serve(listener, app(products)).await
}

async fn list_products(
    State(catalog): State<Catalog>,
    Query(params): Query<PageParams>,
) -> Json<ProductsPage> {
    Json(paginate(catalog.iter(), params.limit, params.skip))
}

async fn search_products(
    State(catalog): State<Catalog>,
    Query(params): Query<SearchParams>,
) -> Json<ProductsPage> {
    let needle = params.q.trim().to_lowercase();
    let hits = catalog.iter().filter(|p| matches_query(p, &needle));
    Json(paginate(hits, params.limit, params.skip))
}

async fn products_by_category(
    State(catalog): State<Catalog>,
    Path(category): Path<String>,
    Query(params): Query<PageParams>,
) -> Json<ProductsPage> {
    let hits = catalog
        .iter()
        .filter(|p| p.get("category").and_then(Value::as_str) == Some(category.as_str()));
    Json(paginate(hits, params.limit, params.skip))
}

async fn get_product(
    State(catalog): State<Catalog>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    catalog
        .iter()
        .find(|p| p.get("id").and_then(Value::as_i64) == Some(id))
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("Product with id '{id}' not found") })),
            )
        })
}

/// `limit=0` returns everything after `skip`.
fn paginate<'a>(
    items: impl Iterator<Item = &'a Value>,
    limit: Option<usize>,
    skip: Option<usize>,
) -> ProductsPage {
    let items: Vec<&Value> = items.collect();
    let total = items.len();
    let skip = skip.unwrap_or(0);
    let limit = match limit.unwrap_or(DEFAULT_LIMIT) {
        0 => total,
        n => n,
    };
    let products: Vec<Value> = items.into_iter().skip(skip).take(limit).cloned().collect();
    ProductsPage {
        limit: products.len(),
        products,
        total,
        skip,
    }
}

fn matches_query(product: &Value, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    ["title", "description", "category", "brand"].iter().any(|key| {
        product
            .get(*key)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: i64) -> Vec<Value> {
        (1..=n).map(|id| json!({ "id": id, "title": format!("Item {id}") })).collect()
    }

    #[test]
    fn fixture_is_valid_json() {
        let products = fixture().unwrap();
        assert_eq!(products.len(), 12);
        assert!(products.iter().all(Value::is_object));
    }

    #[test]
    fn paginate_applies_skip_and_limit() {
        let all = records(25);
        let page = paginate(all.iter(), Some(10), Some(20));
        assert_eq!(page.total, 25);
        assert_eq!(page.skip, 20);
        assert_eq!(page.limit, 5);
        assert_eq!(page.products[0]["id"], 21);
    }

    #[test]
    fn paginate_zero_limit_returns_rest() {
        let all = records(40);
        let page = paginate(all.iter(), Some(0), None);
        assert_eq!(page.products.len(), 40);
    }

    #[test]
    fn paginate_defaults_to_thirty() {
        let all = records(40);
        let page = paginate(all.iter(), None, None);
        assert_eq!(page.products.len(), 30);
    }

    #[test]
    fn query_matching_is_case_insensitive() {
        let p = json!({ "title": "iPhone 9", "category": "smartphones" });
        assert!(matches_query(&p, "phone"));
        assert!(matches_query(&p, ""));
        assert!(!matches_query(&p, "lamp"));
    }

    #[test]
    fn query_matching_ignores_non_string_fields() {
        let p = json!({ "title": 12, "brand": null });
        assert!(!matches_query(&p, "12"));
    }
}
