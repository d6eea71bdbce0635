//! # SmartCart Eval
//!
//! Offline tooling around the recommender:
//!
//! - [`RecommendationEvaluator`] - Precision@K, Recall@K, NDCG@K and MAP
//! - [`EmbeddingMatrix`] - Dense N x D embeddings
//! - [`EmbeddingAnalyzer`] - Diversity and cluster separation diagnostics
//! - [`fuse`] - Weighted text + image embedding fusion
//! - [`validate_table`] / [`validate_embeddings`] - Advisory data checks
//!
//! ## Example
//!
//! ```rust
//! use smartcart_eval::RecommendationEvaluator;
//! use std::collections::HashSet;
//!
//! let evaluator = RecommendationEvaluator::default();
//! let relevant: HashSet<_> = ["B", "D"].into_iter().collect();
//! let metrics = evaluator.evaluate_all(&["A", "B", "C", "D"], &relevant);
//!
//! assert_eq!(metrics["precision@1"], 0.0);
//! assert_eq!(metrics["recall@3"], 0.5);
//! ```

pub mod distance;
pub mod embedding;
pub mod error;
pub mod evaluator;
pub mod matrix;
pub mod validate;

pub use distance::{cosine_similarity, euclidean_distance};
pub use embedding::{
    cluster_separation, diversity, fuse, ClusterCentroid, ClusterSeparation, DiversityStats, EmbeddingAnalyzer,
    FusionWeights, DEFAULT_DIVERSITY_SAMPLE_SIZE,
};
pub use error::{EvalError, Result};
pub use evaluator::{
    average_precision, ndcg_at_k, precision_at_k, recall_at_k, MetricMap, RecommendationEvaluator,
    RelevanceJudgment, DEFAULT_K_VALUES,
};
pub use matrix::EmbeddingMatrix;
pub use validate::{
    validate_embeddings, validate_table, EmbeddingStats, MissingValues, Table, TableStats, ValidationReport,
    LOW_VARIANCE_THRESHOLD,
};
