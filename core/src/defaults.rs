//! Default values for every decoded field, in one place.
//!
//! Scalar fields read their fallback value from these tables through
//! [`lookup`]. Composite entries carry no value and only name the shape of
//! the fallback: `List` is an empty sequence, `Record` is the nested record
//! decoded from nothing (so its own table applies), and `Absent` is `None`.
//! The decoder's tests check every entry here against what it produces.

/// What a field decodes to when it is absent, null, or unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Int(i64),
    Float(f64),
    Text(&'static str),
    /// Empty sequence.
    List,
    /// Nested record with every field at its own default.
    Record,
    /// No value; used for optional timestamps.
    Absent,
}

pub type FieldTable = &'static [(&'static str, FieldDefault)];

pub const PRODUCT: FieldTable = &[
    ("id", FieldDefault::Int(0)),
    ("title", FieldDefault::Text("")),
    ("description", FieldDefault::Text("")),
    ("category", FieldDefault::Text("")),
    ("price", FieldDefault::Float(0.0)),
    ("discountPercentage", FieldDefault::Float(0.0)),
    ("rating", FieldDefault::Float(0.0)),
    ("stock", FieldDefault::Int(0)),
    ("tags", FieldDefault::List),
    ("brand", FieldDefault::Text("")),
    ("sku", FieldDefault::Text("")),
    ("weight", FieldDefault::Float(0.0)),
    ("dimensions", FieldDefault::Record),
    ("warrantyInformation", FieldDefault::Text("")),
    ("shippingInformation", FieldDefault::Text("")),
    ("availabilityStatus", FieldDefault::Text("")),
    ("reviews", FieldDefault::List),
    ("returnPolicy", FieldDefault::Text("")),
    ("minimumOrderQuantity", FieldDefault::Int(0)),
    ("images", FieldDefault::List),
    ("thumbnail", FieldDefault::Text("")),
];

pub const DIMENSIONS: FieldTable = &[
    ("width", FieldDefault::Float(0.0)),
    ("height", FieldDefault::Float(0.0)),
    ("depth", FieldDefault::Float(0.0)),
];

pub const REVIEW: FieldTable = &[
    ("rating", FieldDefault::Int(0)),
    ("comment", FieldDefault::Text("")),
    ("date", FieldDefault::Absent),
    ("reviewerName", FieldDefault::Text("")),
    ("reviewerEmail", FieldDefault::Text("")),
];

pub const PAGE: FieldTable = &[
    ("products", FieldDefault::List),
    ("total", FieldDefault::Int(0)),
    ("skip", FieldDefault::Int(0)),
    ("limit", FieldDefault::Int(0)),
];

/// Default for `key` in `table`. Unknown keys fall back to `Absent`.
pub fn lookup(table: FieldTable, key: &str) -> FieldDefault {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, default)| *default)
        .unwrap_or(FieldDefault::Absent)
}
