//! Catalog accessor.
//!
//! The product list is read once at startup and never changes afterwards.
//! Queries keep the source order.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::domain::aggregates::{Product, ProductError, ALL_CATEGORIES};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("Malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(#[from] ProductError),
}

#[derive(Deserialize)]
struct CatalogDocument { products: Vec<Product> }

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog { products: Vec<Product> }

impl Catalog {
    /// Rejects duplicate ids and negative prices; no partial catalog is kept.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for p in &products {
            if !seen.insert(p.id()) { return Err(ProductError::DuplicateId(p.id().to_string()).into()); }
            if p.price().is_sign_negative() && !p.price().is_zero() { return Err(ProductError::NegativePrice(p.id().to_string()).into()); }
        }
        Ok(Self { products })
    }

    /// Parses a `{"products": [...]}` document.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(raw)?;
        Self::new(doc.products)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await
            .map_err(|source| CatalogError::Io { path: path.display().to_string(), source })?;
        let catalog = Self::from_json(&raw)?;
        info!(products = catalog.len(), path = %path.display(), "catalog loaded");
        Ok(catalog)
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }
    pub fn find(&self, id: &str) -> Option<&Product> { self.products.iter().find(|p| p.id() == id) }

    /// Case-insensitive name search combined with a category tag
    /// (`"all"` matches every category).
    pub fn filter(&self, search_term: &str, category: &str) -> Vec<&Product> {
        let needle = search_term.to_lowercase();
        self.products.iter().filter(|p| p.name_contains(&needle) && p.in_category(category)).collect()
    }

    /// Distinct categories in first-seen order, without the `"all"` pseudo-category.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.products.iter().map(Product::category).filter(|c| *c != ALL_CATEGORIES && seen.insert(*c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn catalog() -> Catalog {
        Catalog::from_json(r#"{"products":[
            {"id":"1","name":"Pipe A","price":10,"category":"pipes","img":"a.jpg","description":""},
            {"id":"2","name":"Valve B","price":20,"category":"valves","img":"b.jpg","description":""},
            {"id":"3","name":"Elbow Pipe","price":5.5,"category":"pipes","img":"c.jpg","description":""}
        ]}"#).unwrap()
    }

    fn names(products: Vec<&Product>) -> Vec<&str> { products.into_iter().map(Product::name).collect() }

    #[test]
    fn test_filter() {
        let two = Catalog::new(vec![
            Product::new("1", "Pipe A", Decimal::ONE, "pipes"),
            Product::new("2", "Valve B", Decimal::ONE, "valves"),
        ]).unwrap();
        assert_eq!(names(two.filter("pipe", "all")), vec!["Pipe A"]);
        assert_eq!(names(two.filter("", "valves")), vec!["Valve B"]);
        assert!(two.filter("pump", "all").is_empty());
    }

    #[test]
    fn test_filter_keeps_source_order() {
        let c = catalog();
        assert_eq!(names(c.filter("PIPE", "all")), vec!["Pipe A", "Elbow Pipe"]);
        assert_eq!(names(c.filter("", "pipes")), vec!["Pipe A", "Elbow Pipe"]);
        assert_eq!(c.filter("", "all").len(), 3);
        assert!(c.filter("valve", "pipes").is_empty());
    }

    #[test]
    fn test_find_and_categories() {
        let c = catalog();
        assert_eq!(c.find("3").map(Product::price), Some(Decimal::new(55, 1)));
        assert!(c.find("9").is_none());
        assert_eq!(c.categories(), vec!["pipes", "valves"]);
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(matches!(Catalog::from_json("<html>"), Err(CatalogError::Malformed(_))));
        assert!(matches!(Catalog::from_json(r#"{"items":[]}"#), Err(CatalogError::Malformed(_))));
        let dup = r#"{"products":[{"id":"1","name":"A","price":1,"category":"x"},{"id":"1","name":"B","price":2,"category":"x"}]}"#;
        assert!(matches!(Catalog::from_json(dup), Err(CatalogError::Invalid(ProductError::DuplicateId(_)))));
        let neg = r#"{"products":[{"id":"1","name":"A","price":-1,"category":"x"}]}"#;
        assert!(matches!(Catalog::from_json(neg), Err(CatalogError::Invalid(ProductError::NegativePrice(_)))));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(dir.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
