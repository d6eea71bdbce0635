//! # SmartCart Core
//!
//! Core library for the SmartCart recommender.
//!
//! This crate provides the catalog model and the ranking algorithm:
//!
//! - [`Product`] - An immutable catalog entry
//! - [`Catalog`] - Read-only product store with category/brand listings
//! - [`QueryContext`] - Free-text query plus structured filters
//! - [`RelevanceScorer`] - Weighted substring relevance between a query and a product
//! - [`RecommendationEngine`] - Filter, rank and truncate
//! - [`CatalogAnalytics`] - Descriptive statistics over the catalog
//!
//! ## Example
//!
//! ```rust
//! use smartcart_core::{Catalog, Product, QueryContext, RecommendationEngine};
//!
//! let catalog = Catalog::new(vec![
//!     Product::new(1, "iPhone 15 Pro Max", "Apple", 1199.99).with_rating(4.8),
//!     Product::new(2, "Galaxy S24 Ultra", "Samsung", 1299.99).with_rating(4.7),
//! ]).unwrap();
//!
//! let engine = RecommendationEngine::default();
//! let ctx = QueryContext::new().with_query("iphone").with_max_price(1500.0);
//! let result = engine.recommend(&catalog, &ctx);
//!
//! assert_eq!(result.total, 1);
//! assert_eq!(result.products[0].id, 1);
//! ```

pub mod analytics;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod filter;
pub mod product;
pub mod query;
pub mod scorer;

pub use analytics::{BrandCount, CatalogAnalytics, PriceRanges};
pub use catalog::Catalog;
pub use engine::{recommend, EngineConfig, Recommendations, RecommendationEngine, ScoredProduct};
pub use error::{Error, Result};
pub use filter::{Filter, FilterCondition, ProductFilter};
pub use product::{Product, ProductId, REQUIRED_FIELDS};
pub use query::{QueryContext, DEFAULT_LIMIT};
pub use scorer::{RelevanceScorer, ScoreBreakdown, ScoringWeights};
