//! Text relevance scoring
//!
//! Scores a product against a free-text query with permissive substring
//! matching. Each matching signal adds its weight; there is no early exit and
//! no length normalization, so a product matching in several fields always
//! outranks one matching in a single field of the same weight.
//!
//! | signal | unit | default weight |
//! |---|---|---|
//! | title | per query token contained in the title | 3.0 |
//! | description | per query token contained in the description | 2.0 |
//! | categories | per category containing the whole query | 2.0 |
//! | brand | brand contains the whole query | 1.0 |
//! | features | per (feature, token) pair where the feature contains the token | 1.0 |
//! | specifications | specifications contain the whole query | 1.0 |
//!
//! An empty query scores every product with the flat baseline (5.0).

use crate::Product;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Query tokens; most queries are a handful of words
pub type Tokens<'q> = SmallVec<[&'q str; 8]>;

/// Split a lower-cased query on whitespace
#[inline]
pub fn tokenize(query: &str) -> Tokens<'_> {
    query.split_whitespace().collect()
}

/// Per-field weights of the relevance score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub title: f64,
    pub description: f64,
    pub category: f64,
    pub brand: f64,
    pub feature: f64,
    pub specifications: f64,
    /// Score given to every product when the query is empty
    pub baseline: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title: 3.0,
            description: 2.0,
            category: 2.0,
            brand: 1.0,
            feature: 1.0,
            specifications: 1.0,
            baseline: 5.0,
        }
    }
}

/// Per-field contributions to a relevance score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub baseline: f64,
    pub title: f64,
    pub description: f64,
    pub categories: f64,
    pub brand: f64,
    pub features: f64,
    pub specifications: f64,
}

impl ScoreBreakdown {
    #[inline]
    pub fn total(&self) -> f64 {
        self.baseline
            + self.title
            + self.description
            + self.categories
            + self.brand
            + self.features
            + self.specifications
    }
}

/// Scores products against free-text queries
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Relevance of `product` for `query`, always >= 0 for non-negative weights
    #[inline]
    pub fn score(&self, product: &Product, query: &str) -> f64 {
        self.explain(product, query).total()
    }

    /// Score with the per-field breakdown; the fields sum to [`RelevanceScorer::score`]
    pub fn explain(&self, product: &Product, query: &str) -> ScoreBreakdown {
        let w = &self.weights;
        if query.is_empty() {
            return ScoreBreakdown {
                baseline: w.baseline,
                ..ScoreBreakdown::default()
            };
        }

        let query = query.to_lowercase();
        let tokens = tokenize(&query);

        let title = product.title.to_lowercase();
        let description = product.description.to_lowercase();

        let title_hits = count_contained(&tokens, &title);
        let description_hits = count_contained(&tokens, &description);
        let category_hits = product
            .categories
            .iter()
            .filter(|c| c.to_lowercase().contains(query.as_str()))
            .count();
        let brand_hit = product.brand.to_lowercase().contains(query.as_str());
        let feature_hits: usize = product
            .features
            .iter()
            .map(|f| count_contained(&tokens, &f.to_lowercase()))
            .sum();
        let specifications_hit = product.specifications.to_lowercase().contains(query.as_str());

        ScoreBreakdown {
            baseline: 0.0,
            title: w.title * title_hits as f64,
            description: w.description * description_hits as f64,
            categories: w.category * category_hits as f64,
            brand: if brand_hit { w.brand } else { 0.0 },
            features: w.feature * feature_hits as f64,
            specifications: if specifications_hit { w.specifications } else { 0.0 },
        }
    }
}

/// Number of tokens (duplicates included) contained in `haystack`
#[inline]
fn count_contained(tokens: &[&str], haystack: &str) -> usize {
    tokens.iter().filter(|t| haystack.contains(**t)).count()
}

/// Score with the default weights
#[inline]
pub fn score(product: &Product, query: &str) -> f64 {
    RelevanceScorer::default().score(product, query)
}
