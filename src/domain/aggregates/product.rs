//! Product Aggregate
//!
//! Products arrive from the catalog document and are never mutated by the
//! core; the cart keeps its own snapshot of each one.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: String,
    name: String,
    #[serde(deserialize_with = "decimal_from_number_or_text")]
    price: Decimal,
    category: String,
    #[serde(rename = "img", default)]
    image: String,
    #[serde(default)]
    description: String,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal, category: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), price, category: category.into(), image: String::new(), description: String::new() }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self { self.image = image.into(); self }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn price(&self) -> Decimal { self.price }
    pub fn category(&self) -> &str { &self.category }
    pub fn image(&self) -> &str { &self.image }
    pub fn description(&self) -> &str { &self.description }

    /// `needle` must already be lower-cased; an empty needle matches everything.
    pub fn name_contains(&self, needle: &str) -> bool {
        needle.is_empty() || self.name.to_lowercase().contains(needle)
    }

    pub fn in_category(&self, category: &str) -> bool {
        category == super::ALL_CATEGORIES || self.category == category
    }
}

/// Catalog files write prices as JSON numbers, persisted snapshots as strings.
fn decimal_from_number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw { Number(serde_json::Number), Text(String) }

    let text = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    };
    Decimal::from_str(text.trim())
        .or_else(|_| Decimal::from_scientific(text.trim()))
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { DuplicateId(String), NegativePrice(String) }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate product id {id}"),
            Self::NegativePrice(id) => write!(f, "product {id} has a negative price"),
        }
    }
}
