//! Domain models for the product catalog.
//!
//! # Design
//! Values are built once by the decoder and never mutated afterwards; all
//! nested data (`Dimensions`, `Review`) is owned by its `Product`. Derived
//! values such as the discounted price are computed on demand rather than
//! stored, so they can never disagree with the fields they come from.
//!
//! The types derive `Serialize` (camelCase, matching the wire names) so hosts
//! can re-emit decoded records, but deliberately not `Deserialize`: the only
//! way in is `decode`, which applies the defaulting rules.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single catalog product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: i64,
    pub tags: Vec<String>,
    pub brand: String,
    pub sku: String,
    pub weight: f64,
    pub dimensions: Dimensions,
    pub warranty_information: String,
    pub shipping_information: String,
    pub availability_status: String,
    pub reviews: Vec<Review>,
    pub return_policy: String,
    pub minimum_order_quantity: i64,
    pub images: Vec<String>,
    pub thumbnail: String,
}

impl Product {
    /// `price` reduced by `discount_percentage`, never below zero.
    pub fn discounted_price(&self) -> f64 {
        (self.price * (1.0 - self.discount_percentage / 100.0)).max(0.0)
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn is_on_sale(&self) -> bool {
        self.discount_percentage > 0.0
    }

    /// `price` as a US-dollar string with two decimals, e.g. `"$19.99"`.
    pub fn display_price(&self) -> String {
        format_usd(self.price)
    }

    /// Badge text such as `"-15%"`, or `None` when there is no discount.
    pub fn formatted_discount(&self) -> Option<String> {
        self.is_on_sale()
            .then(|| format!("-{:.0}%", self.discount_percentage))
    }
}

fn format_usd(amount: f64) -> String {
    // -0.0 compares equal to 0.0 but would print as "-0.00".
    let amount = if amount == 0.0 { 0.0 } else { amount };
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${amount:.2}")
    }
}

/// Physical size of a product. Unknown dimensions are all zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }
}

/// A customer review attached to a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub rating: i64,
    pub comment: String,
    /// `None` when the upstream date was missing or not ISO-8601.
    pub date: Option<DateTime<Utc>>,
    pub reviewer_name: String,
    pub reviewer_email: String,
}

impl Review {
    pub fn is_positive(&self) -> bool {
        self.rating >= 4
    }

    pub fn is_negative(&self) -> bool {
        self.rating <= 2
    }
}

/// One page of a list or search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

impl ProductPage {
    /// Envelope values come straight from the server, so the arithmetic
    /// here saturates instead of overflowing.
    pub fn has_more(&self) -> bool {
        self.skip.saturating_add(self.limit) < self.total
    }

    /// 1-based page index. A page without a limit is always page 1.
    pub fn current_page(&self) -> i64 {
        if self.limit > 0 {
            self.skip / self.limit + 1
        } else {
            1
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.limit > 0 {
            let total = self.total.max(0);
            total / self.limit + i64::from(total % self.limit != 0)
        } else {
            1
        }
    }
}
