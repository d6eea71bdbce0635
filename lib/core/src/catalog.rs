//! Read-only product catalog
//!
//! The catalog is loaded once, validated, and then only read. Category and
//! brand listings are derived at load time so they always agree with the
//! products they were built from.

use crate::{Error, Product, ProductId, Result};
use ahash::AHashMap;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// The product data set bundled with the crate
const EMBEDDED_PRODUCTS: &str = include_str!("../data/products.json");

/// An ordered, immutable collection of products
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: AHashMap<ProductId, usize>,
    categories: Vec<String>,
    brands: Vec<String>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and invalid prices
    pub fn new(products: Vec<Product>) -> Result<Self> {
        let mut by_id = AHashMap::with_capacity(products.len());
        let mut categories = BTreeSet::new();
        let mut brands = BTreeSet::new();

        for (idx, product) in products.iter().enumerate() {
            if !product.price.is_finite() || product.price < 0.0 {
                return Err(Error::InvalidProduct {
                    id: product.id,
                    reason: format!("price must be a non-negative number, got {}", product.price),
                });
            }
            if by_id.insert(product.id, idx).is_some() {
                return Err(Error::DuplicateProduct(product.id));
            }
            categories.extend(product.categories.iter().cloned());
            brands.insert(product.brand.clone());
        }

        debug!(
            products = products.len(),
            categories = categories.len(),
            brands = brands.len(),
            "Catalog loaded"
        );

        Ok(Self {
            products,
            by_id,
            categories: categories.into_iter().collect(),
            brands: brands.into_iter().collect(),
        })
    }

    /// Parse a JSON array of products
    pub fn from_json(json: &str) -> Result<Self> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Load a JSON catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// The bundled electronics catalog
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_PRODUCTS)
    }

    /// Raw JSON text of the bundled catalog, before any parsing
    pub fn embedded_json() -> &'static str {
        EMBEDDED_PRODUCTS
    }

    /// All products in catalog order
    #[inline]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.by_id.get(&id).map(|&idx| &self.products[idx])
    }

    /// Like [`Catalog::get`] but reports a missing id as an error
    pub fn require(&self, id: ProductId) -> Result<&Product> {
        self.get(id).ok_or(Error::ProductNotFound(id))
    }

    /// Distinct categories, sorted
    #[inline]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Distinct brands, sorted
    #[inline]
    pub fn brands(&self) -> &[String] {
        &self.brands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> Vec<Product> {
        vec![
            Product::new(1, "Galaxy S24", "Samsung", 899.0).with_categories(["Smartphones", "Android"]),
            Product::new(2, "MacBook Air", "Apple", 1099.0).with_categories(["Laptops"]),
            Product::new(3, "Pixel 8", "Google", 699.0).with_categories(["Smartphones", "Android"]),
        ]
    }

    #[test]
    fn test_derived_listings_are_sorted_and_distinct() {
        let catalog = Catalog::new(sample()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.categories(), ["Android", "Laptops", "Smartphones"]);
        assert_eq!(catalog.brands(), ["Apple", "Google", "Samsung"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut products = sample();
        products.push(Product::new(2, "iPad", "Apple", 599.0));
        assert!(matches!(Catalog::new(products), Err(Error::DuplicateProduct(2))));
    }

    #[test]
    fn test_negative_price_rejected() {
        let products = vec![Product::new(9, "Broken", "Acme", -1.0)];
        assert!(matches!(Catalog::new(products), Err(Error::InvalidProduct { id: 9, .. })));
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = Catalog::new(sample()).unwrap();
        assert_eq!(catalog.get(3).unwrap().title, "Pixel 8");
        assert!(catalog.get(42).is_none());
        assert!(matches!(catalog.require(42), Err(Error::ProductNotFound(42))));
    }

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.get(1).unwrap().title, "iPhone 15 Pro Max");
        assert!(catalog.categories().iter().any(|c| c == "Smartphones"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&sample()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        assert!(matches!(Catalog::from_json("[{\"id\": 1}"), Err(Error::Serialization(_))));
    }
}
