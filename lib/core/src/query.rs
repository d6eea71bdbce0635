use serde::{Deserialize, Serialize};

/// Number of results returned when the caller does not ask for a limit
pub const DEFAULT_LIMIT: usize = 20;

/// Parameters of one recommendation request.
///
/// Every filter is optional; an absent field skips its condition. Price and
/// rating bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryContext {
    pub query: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub limit: Option<usize>,
}

impl QueryContext {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The free-text query, or `None` when it is absent or empty
    #[inline]
    pub fn query_text(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    /// Requested limit, falling back to `default` when absent or zero
    #[inline]
    pub fn limit_or(&self, default: usize) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => default,
        }
    }
}
