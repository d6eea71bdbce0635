//! Recommendation engine
//!
//! Filters the catalog with the structured part of a [`QueryContext`], ranks
//! the survivors and truncates to the requested limit.
//!
//! With a query, products are ordered by (relevance score, rating) descending
//! and products scoring exactly zero are dropped. Without one, products are
//! ordered by rating alone. Sorting is stable, so full ties keep catalog order.
//!
//! Scoring costs O(products x query tokens x fields) per call. Independent
//! requests can be fanned out with [`RecommendationEngine::recommend_batch`].

use crate::filter::{Filter, ProductFilter};
use crate::query::DEFAULT_LIMIT;
use crate::scorer::{RelevanceScorer, ScoringWeights};
use crate::{Catalog, Product, QueryContext};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Configuration for a recommendation engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Limit applied when the context has none (or zero)
    pub default_limit: usize,
    pub weights: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            weights: ScoringWeights::default(),
        }
    }
}

/// A product paired with its ranking score
#[derive(Debug, Clone, Copy)]
pub struct ScoredProduct<'a> {
    pub product: &'a Product,
    pub score: f64,
}

/// Result of one recommendation call
#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    /// At most `limit` products, best first
    pub products: Vec<Product>,
    /// Number of matching products before truncation
    pub total: usize,
    /// The query as given by the caller
    pub query: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    scorer: RelevanceScorer,
    default_limit: usize,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            scorer: RelevanceScorer::new(config.weights),
            default_limit: config.default_limit.max(1),
        }
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Every matching product in ranked order, with scores.
    ///
    /// Without a query each product carries the scorer's baseline score.
    pub fn rank<'a>(&self, catalog: &'a Catalog, ctx: &QueryContext) -> Vec<ScoredProduct<'a>> {
        let filter = ProductFilter::from_context(ctx);
        let candidates = catalog.products().iter().filter(|p| filter.matches(p));

        match ctx.query_text() {
            Some(query) => {
                let mut ranked: Vec<ScoredProduct<'a>> = candidates
                    .map(|product| ScoredProduct {
                        product,
                        score: self.scorer.score(product, query),
                    })
                    .filter(|scored| scored.score != 0.0)
                    .collect();

                // sort_by is stable: equal (score, rating) keep catalog order
                ranked.sort_by(|a, b| {
                    let a_key = (OrderedFloat(a.score), OrderedFloat(a.product.rating));
                    let b_key = (OrderedFloat(b.score), OrderedFloat(b.product.rating));
                    b_key.cmp(&a_key)
                });
                ranked
            }
            None => {
                let baseline = self.scorer.weights().baseline;
                let mut ranked: Vec<ScoredProduct<'a>> = candidates
                    .map(|product| ScoredProduct { product, score: baseline })
                    .collect();

                ranked.sort_by(|a, b| {
                    OrderedFloat(b.product.rating).cmp(&OrderedFloat(a.product.rating))
                });
                ranked
            }
        }
    }

    /// Filter, rank and truncate
    pub fn recommend(&self, catalog: &Catalog, ctx: &QueryContext) -> Recommendations {
        let ranked = self.rank(catalog, ctx);
        let total = ranked.len();
        let limit = ctx.limit_or(self.default_limit);

        let products: Vec<Product> = ranked
            .into_iter()
            .take(limit)
            .map(|scored| scored.product.clone())
            .collect();

        debug!(
            query = ctx.query.as_deref().unwrap_or(""),
            total,
            returned = products.len(),
            "Recommendation computed"
        );

        Recommendations {
            products,
            total,
            query: ctx.query.clone(),
        }
    }

    /// Evaluate independent requests in parallel; output order matches input
    pub fn recommend_batch(&self, catalog: &Catalog, contexts: &[QueryContext]) -> Vec<Recommendations> {
        contexts
            .par_iter()
            .map(|ctx| self.recommend(catalog, ctx))
            .collect()
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Recommend with the default engine configuration
pub fn recommend(catalog: &Catalog, ctx: &QueryContext) -> Recommendations {
    RecommendationEngine::default().recommend(catalog, ctx)
}
