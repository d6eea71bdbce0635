//! # SmartCart
//!
//! A product recommender: relevance-ranked recommendations over an immutable
//! catalog, catalog analytics, and offline tooling to evaluate rankings and
//! inspect embedding spaces.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! smartcart serve --http-port 8000
//! curl 'http://localhost:8000/api/recommend?query=wireless+headphones&max_price=400'
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use smartcart::prelude::*;
//!
//! let catalog = Catalog::embedded().unwrap();
//! let ctx = QueryContext::new().with_query("laptop").with_limit(5);
//! let result = RecommendationEngine::default().recommend(&catalog, &ctx);
//!
//! assert!(result.products.len() <= 5);
//! assert!(result.total >= result.products.len());
//! ```
//!
//! ## Crate Structure
//!
//! - `smartcart-core` - Product model, catalog, filters, scorer, engine, analytics
//! - `smartcart-eval` - Ranking metrics, embedding diagnostics, data validation
//! - `smartcart-api` - REST API

// Re-export core types
pub use smartcart_core::{
    recommend, Catalog, CatalogAnalytics, EngineConfig, Error, Filter, FilterCondition, Product, ProductFilter,
    ProductId, QueryContext, Recommendations, RecommendationEngine, RelevanceScorer, Result, ScoreBreakdown,
    ScoredProduct, ScoringWeights,
};

// Re-export evaluation tooling
pub use smartcart_eval::{
    EmbeddingAnalyzer, EmbeddingMatrix, EvalError, FusionWeights, RecommendationEvaluator, RelevanceJudgment,
    Table, ValidationReport,
};

// Re-export API
pub use smartcart_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, EmbeddingAnalyzer, EmbeddingMatrix, Filter, FilterCondition, Product, ProductFilter, QueryContext,
        RecommendationEngine, RecommendationEvaluator, RelevanceScorer, RestApi,
    };
}

/// Validation entry points
pub mod validate {
    pub use smartcart_eval::{validate_embeddings, validate_table};
}
