use serde::{Deserialize, Serialize};

/// Unique identifier of a catalog product
pub type ProductId = u64;

/// Fields every raw catalog record must carry
pub const REQUIRED_FIELDS: [&str; 5] = ["id", "title", "brand", "price", "categories"];

/// A catalog entry.
///
/// Products are loaded once with the [`Catalog`](crate::Catalog) and never
/// mutated afterwards, so every accessor hands out borrowed data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub brand: String,
    /// Price in dollars, never negative
    pub price: f64,
    /// Ordered category labels; a product may sit in several
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Opaque image reference
    #[serde(default)]
    pub image_url: String,
    /// Rating, conventionally 0.0 - 5.0
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: String,
}

impl Product {
    /// Create a product with the mandatory fields; the rest start empty
    #[inline]
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, brand: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            title: title.into(),
            brand: brand.into(),
            price,
            categories: Vec::new(),
            description: String::new(),
            image_url: String::new(),
            rating: 0.0,
            features: Vec::new(),
            specifications: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_specifications(mut self, specifications: impl Into<String>) -> Self {
        self.specifications = specifications.into();
        self
    }

    /// Exact, case-sensitive category membership
    #[inline]
    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}
