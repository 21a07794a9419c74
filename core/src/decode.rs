//! Total decoding from loosely-typed JSON into catalog models.
//!
//! # Design
//! Upstream records drift: fields disappear, turn into `null`, or arrive as
//! the wrong JSON type. Decoding a record therefore never fails. Each field
//! is resolved the same way:
//!
//! 1. absent or `null` -> the default from `defaults`;
//! 2. right type -> used as is;
//! 3. wrong type but safely convertible (`"12"` for an integer) -> converted,
//!    recorded as `Coerced`;
//! 4. anything else -> default, recorded as `WrongType`.
//!
//! Nested records (`dimensions`, each review) follow the same rules
//! recursively. A nested entry that is not an object becomes a default
//! record in place, so review order and count are preserved.
//!
//! Every deviation is collected into a `DecodeReport`. `decode_product` logs
//! the report at `warn`; `decode_product_with_report` hands it back instead.
//!
//! Only the page envelope has structural requirements (a JSON object with a
//! `products` array); `decode_page` is the single fallible entry point.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use crate::defaults::{self, FieldDefault, FieldTable};
use crate::types::{Dimensions, Product, ProductPage, Review};

/// Why a field did not decode cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyKind {
    /// The value had an unusable type; the default was used.
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    /// The value had the wrong type but was converted.
    Coerced { found: &'static str },
    /// A string that should hold a timestamp did not parse.
    Unparseable,
    /// A nested record was not a JSON object; a default record was used.
    NotAnObject { found: &'static str },
    /// A sequence element of the wrong type was skipped.
    DroppedElement { found: &'static str },
}

/// One field-level deviation, addressed by its path (`reviews[1].date`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAnomaly {
    pub path: String,
    pub kind: AnomalyKind,
}

impl fmt::Display for FieldAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AnomalyKind::WrongType { expected, found } => {
                write!(f, "{}: expected {expected}, found {found}", self.path)
            }
            AnomalyKind::Coerced { found } => write!(f, "{}: coerced from {found}", self.path),
            AnomalyKind::Unparseable => write!(f, "{}: unparseable timestamp", self.path),
            AnomalyKind::NotAnObject { found } => {
                write!(f, "{}: expected object, found {found}", self.path)
            }
            AnomalyKind::DroppedElement { found } => {
                write!(f, "{}: dropped {found} element", self.path)
            }
        }
    }
}

/// Field anomalies collected while decoding one or more records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    anomalies: Vec<FieldAnomaly>,
}

impl DecodeReport {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn anomalies(&self) -> &[FieldAnomaly] {
        &self.anomalies
    }

    /// Anomalies whose path is exactly `path`.
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a AnomalyKind> + 'a {
        self.anomalies
            .iter()
            .filter(move |a| a.path == path)
            .map(|a| &a.kind)
    }

    /// Emit every anomaly as a `warn` event.
    pub fn log(&self) {
        for anomaly in &self.anomalies {
            warn!(path = %anomaly.path, "field decode anomaly: {anomaly}");
        }
    }

    fn push(&mut self, path: String, kind: AnomalyKind) {
        self.anomalies.push(FieldAnomaly { path, kind });
    }
}

/// Decode one product record. Never fails; anomalies are logged.
pub fn decode_product(raw: &Value) -> Product {
    let (product, report) = decode_product_with_report(raw);
    report.log();
    product
}

/// Decode one product record and return the anomalies instead of logging.
pub fn decode_product_with_report(raw: &Value) -> (Product, DecodeReport) {
    let mut report = DecodeReport::default();
    let product = product_at(raw, String::new(), &mut report);
    (product, report)
}

/// Decode a list/search envelope.
///
/// Fails only when the body is not an object or `products` is not an array;
/// individual products decode totally. Anomalies are logged.
pub fn decode_page(raw: &Value) -> Result<ProductPage, String> {
    let (page, report) = decode_page_with_report(raw)?;
    report.log();
    Ok(page)
}

pub fn decode_page_with_report(raw: &Value) -> Result<(ProductPage, DecodeReport), String> {
    let map = raw
        .as_object()
        .ok_or_else(|| format!("expected a JSON object, found {}", type_name(raw)))?;
    let items = match map.get("products") {
        Some(Value::Array(items)) => items,
        Some(other) => return Err(format!("`products` must be an array, found {}", type_name(other))),
        None => return Err("missing `products` array".to_string()),
    };

    let mut report = DecodeReport::default();
    let products = items
        .iter()
        .enumerate()
        .map(|(i, item)| product_at(item, format!("products[{i}]"), &mut report))
        .collect();

    let mut fields = Fields::new(Some(map), defaults::PAGE, String::new(), &mut report);
    let page = ProductPage {
        products,
        total: fields.int("total"),
        skip: fields.int("skip"),
        limit: fields.int("limit"),
    };
    Ok((page, report))
}

fn product_at(raw: &Value, path: String, report: &mut DecodeReport) -> Product {
    let map = record(raw, &path, report);
    let mut f = Fields::new(map, defaults::PRODUCT, path, report);
    Product {
        id: f.int("id"),
        title: f.text("title"),
        description: f.text("description"),
        category: f.text("category"),
        price: f.float("price"),
        discount_percentage: f.float("discountPercentage"),
        rating: f.float("rating"),
        stock: f.int("stock"),
        tags: f.strings("tags"),
        brand: f.text("brand"),
        sku: f.text("sku"),
        weight: f.float("weight"),
        dimensions: f.nested("dimensions", dimensions_at),
        warranty_information: f.text("warrantyInformation"),
        shipping_information: f.text("shippingInformation"),
        availability_status: f.text("availabilityStatus"),
        reviews: f.records("reviews", review_at),
        return_policy: f.text("returnPolicy"),
        minimum_order_quantity: f.int("minimumOrderQuantity"),
        images: f.strings("images"),
        thumbnail: f.text("thumbnail"),
    }
}

fn dimensions_at(raw: &Value, path: String, report: &mut DecodeReport) -> Dimensions {
    let map = record(raw, &path, report);
    let mut f = Fields::new(map, defaults::DIMENSIONS, path, report);
    Dimensions {
        width: f.float("width"),
        height: f.float("height"),
        depth: f.float("depth"),
    }
}

fn review_at(raw: &Value, path: String, report: &mut DecodeReport) -> Review {
    let map = record(raw, &path, report);
    let mut f = Fields::new(map, defaults::REVIEW, path, report);
    Review {
        rating: f.int("rating"),
        comment: f.text("comment"),
        date: f.timestamp("date"),
        reviewer_name: f.text("reviewerName"),
        reviewer_email: f.text("reviewerEmail"),
    }
}

/// The object behind `raw`, recording an anomaly when it is something else.
/// `null` counts as an absent record.
fn record<'a>(raw: &'a Value, path: &str, report: &mut DecodeReport) -> Option<&'a Map<String, Value>> {
    match raw {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            report.push(
                display_path(path),
                AnomalyKind::NotAnObject {
                    found: type_name(other),
                },
            );
            None
        }
    }
}

static NULL: Value = Value::Null;

/// Field resolver for one record.
struct Fields<'a, 'r> {
    map: Option<&'a Map<String, Value>>,
    table: FieldTable,
    path: String,
    report: &'r mut DecodeReport,
}

impl<'a, 'r> Fields<'a, 'r> {
    fn new(
        map: Option<&'a Map<String, Value>>,
        table: FieldTable,
        path: String,
        report: &'r mut DecodeReport,
    ) -> Self {
        Self {
            map,
            table,
            path,
            report,
        }
    }

    /// Present, non-null value for `key`.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map?.get(key).filter(|v| !v.is_null())
    }

    fn child(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn note(&mut self, key: &str, kind: AnomalyKind) {
        let path = self.child(key);
        self.report.push(path, kind);
    }

    fn int(&mut self, key: &str) -> i64 {
        let default = match defaults::lookup(self.table, key) {
            FieldDefault::Int(n) => n,
            _ => 0,
        };
        let Some(value) = self.get(key) else {
            return default;
        };
        if let Some(n) = value.as_i64() {
            return n;
        }
        let converted = match value {
            Value::Number(n) => n.as_f64().and_then(integral),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            _ => None,
        };
        self.resolve(key, converted, "integer", value, default)
    }

    fn float(&mut self, key: &str) -> f64 {
        let default = match defaults::lookup(self.table, key) {
            FieldDefault::Float(x) => x,
            _ => 0.0,
        };
        let Some(value) = self.get(key) else {
            return default;
        };
        if let Value::Number(n) = value {
            if let Some(x) = n.as_f64() {
                return x;
            }
        }
        let converted = match value {
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            _ => None,
        };
        self.resolve(key, converted, "number", value, default)
    }

    fn text(&mut self, key: &str) -> String {
        let default = match defaults::lookup(self.table, key) {
            FieldDefault::Text(s) => s,
            _ => "",
        };
        let Some(value) = self.get(key) else {
            return default.to_string();
        };
        if let Value::String(s) = value {
            return s.clone();
        }
        let converted = match value {
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
        self.resolve(key, converted, "string", value, default.to_string())
    }

    /// Sequence of strings; non-string elements are dropped.
    fn strings(&mut self, key: &str) -> Vec<String> {
        let Some(items) = self.array(key) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => out.push(s.clone()),
                other => {
                    let path = format!("{}[{i}]", self.child(key));
                    self.report.push(
                        path,
                        AnomalyKind::DroppedElement {
                            found: type_name(other),
                        },
                    );
                }
            }
        }
        out
    }

    /// Sequence of nested records; every element yields exactly one record.
    fn records<T>(
        &mut self,
        key: &str,
        decode: fn(&Value, String, &mut DecodeReport) -> T,
    ) -> Vec<T> {
        let Some(items) = self.array(key) else {
            return Vec::new();
        };
        let base = self.child(key);
        items
            .iter()
            .enumerate()
            .map(|(i, item)| decode(item, format!("{base}[{i}]"), self.report))
            .collect()
    }

    /// Nested record. When absent it is decoded from nothing, so each of its
    /// fields takes the default from its own table.
    fn nested<T>(
        &mut self,
        key: &str,
        decode: fn(&Value, String, &mut DecodeReport) -> T,
    ) -> T {
        let value = self.get(key).unwrap_or(&NULL);
        decode(value, self.child(key), self.report)
    }

    fn timestamp(&mut self, key: &str) -> Option<DateTime<Utc>> {
        let value = self.get(key)?;
        let Value::String(s) = value else {
            self.note(
                key,
                AnomalyKind::WrongType {
                    expected: "timestamp string",
                    found: type_name(value),
                },
            );
            return None;
        };
        let parsed = parse_timestamp(s);
        if parsed.is_none() {
            self.note(key, AnomalyKind::Unparseable);
        }
        parsed
    }

    fn array(&mut self, key: &str) -> Option<&'a Vec<Value>> {
        match self.get(key)? {
            Value::Array(items) => Some(items),
            other => {
                self.note(
                    key,
                    AnomalyKind::WrongType {
                        expected: "array",
                        found: type_name(other),
                    },
                );
                None
            }
        }
    }

    fn resolve<T>(
        &mut self,
        key: &str,
        converted: Option<T>,
        expected: &'static str,
        value: &Value,
        default: T,
    ) -> T {
        let found = type_name(value);
        match converted {
            Some(v) => {
                self.note(key, AnomalyKind::Coerced { found });
                v
            }
            None => {
                self.note(key, AnomalyKind::WrongType { expected, found });
                default
            }
        }
    }
}

/// ISO-8601 timestamp. Offsets are honoured; a missing offset means UTC;
/// a bare date means midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn integral(x: f64) -> Option<i64> {
    (x.is_finite() && x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64)
        .then_some(x as i64)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            any::<f64>()
                .prop_filter("finite", |x| x.is_finite())
                .prop_map(Value::from),
            ".{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("id".to_string()),
                        Just("price".to_string()),
                        Just("stock".to_string()),
                        Just("tags".to_string()),
                        Just("dimensions".to_string()),
                        Just("reviews".to_string()),
                        Just("date".to_string()),
                        "[a-z]{1,8}",
                    ],
                    inner,
                    0..8
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Decoding is total over arbitrary JSON.
        #[test]
        fn decode_never_panics(raw in arb_json()) {
            let (product, _) = decode_product_with_report(&raw);
            prop_assert!(product.discounted_price() >= 0.0);
        }

        #[test]
        fn discounted_price_within_bounds(
            price in 0.0f64..1_000_000.0,
            discount in 0.0f64..=100.0,
        ) {
            let p = decode_product(&serde_json::json!({
                "price": price,
                "discountPercentage": discount
            }));
            let expected = price * (1.0 - discount / 100.0);
            prop_assert!((p.discounted_price() - expected).abs() < 1e-9);
            prop_assert!(p.discounted_price() <= price);
        }
    }
}
