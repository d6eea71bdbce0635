//! Ranking-quality metrics
//!
//! Every metric takes an ordered list of recommended ids and an unordered set
//! of relevant ids. Relevant ids missing from the recommendations are not an
//! error, they simply lower recall. Degenerate inputs (k = 0, nothing
//! recommended, nothing relevant) score 0.0 so aggregates stay total.
//!
//! Recommendation lists shorter than k are taken as they are; nothing is
//! padded.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::hash::{BuildHasher, Hash};

/// Default cut-offs for Precision@K, Recall@K and NDCG@K
pub const DEFAULT_K_VALUES: [usize; 4] = [1, 3, 5, 10];

/// Metric name to value, e.g. `"precision@5"` or `"map"`
pub type MetricMap = BTreeMap<String, f64>;

#[inline]
fn hits_at_k<T, S>(recommended: &[T], relevant: &HashSet<T, S>, k: usize) -> usize
where
    T: Eq + Hash,
    S: BuildHasher,
{
    recommended.iter().take(k).filter(|id| relevant.contains(*id)).count()
}

/// Fraction of the first `k` recommendations that are relevant
pub fn precision_at_k<T, S>(recommended: &[T], relevant: &HashSet<T, S>, k: usize) -> f64
where
    T: Eq + Hash,
    S: BuildHasher,
{
    if k == 0 || recommended.is_empty() {
        return 0.0;
    }
    hits_at_k(recommended, relevant, k) as f64 / k as f64
}

/// Fraction of the relevant items found in the first `k` recommendations
pub fn recall_at_k<T, S>(recommended: &[T], relevant: &HashSet<T, S>, k: usize) -> f64
where
    T: Eq + Hash,
    S: BuildHasher,
{
    if relevant.is_empty() {
        return 0.0;
    }
    hits_at_k(recommended, relevant, k) as f64 / relevant.len() as f64
}

/// Precision at the rank of every relevant hit, summed and divided by the
/// number of relevant items
pub fn average_precision<T, S>(recommended: &[T], relevant: &HashSet<T, S>) -> f64
where
    T: Eq + Hash,
    S: BuildHasher,
{
    if relevant.is_empty() {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut precision_sum = 0.0;
    for (rank, id) in recommended.iter().enumerate() {
        if relevant.contains(id) {
            hits += 1;
            precision_sum += hits as f64 / (rank + 1) as f64;
        }
    }
    precision_sum / relevant.len() as f64
}

/// Binary-relevance NDCG over the first `k` recommendations
pub fn ndcg_at_k<T, S>(recommended: &[T], relevant: &HashSet<T, S>, k: usize) -> f64
where
    T: Eq + Hash,
    S: BuildHasher,
{
    if relevant.is_empty() {
        return 0.0;
    }

    let dcg: f64 = recommended
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, id)| relevant.contains(*id))
        .map(|(i, _)| discount(i))
        .sum();

    let idcg: f64 = (0..relevant.len().min(k)).map(discount).sum();

    if idcg > 0.0 {
        dcg / idcg
    } else {
        0.0
    }
}

/// 1 / log2(rank + 1) for the 0-based position `i` (rank = i + 1)
#[inline]
fn discount(i: usize) -> f64 {
    1.0 / ((i + 2) as f64).log2()
}

/// One query's recommendations and its ground truth
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Eq + Hash",
    deserialize = "T: Deserialize<'de> + Eq + Hash"
))]
pub struct RelevanceJudgment<T> {
    pub recommended: Vec<T>,
    pub relevant: HashSet<T>,
}

impl<T: Eq + Hash> RelevanceJudgment<T> {
    pub fn new(recommended: Vec<T>, relevant: impl IntoIterator<Item = T>) -> Self {
        Self {
            recommended,
            relevant: relevant.into_iter().collect(),
        }
    }
}

/// Computes the metric family at a fixed set of cut-offs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationEvaluator {
    k_values: Vec<usize>,
}

impl Default for RecommendationEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_K_VALUES.to_vec())
    }
}

impl RecommendationEvaluator {
    pub fn new(k_values: Vec<usize>) -> Self {
        Self { k_values }
    }

    pub fn k_values(&self) -> &[usize] {
        &self.k_values
    }

    pub fn precision_at_k<T: Eq + Hash, S: BuildHasher>(&self, recommended: &[T], relevant: &HashSet<T, S>, k: usize) -> f64 {
        precision_at_k(recommended, relevant, k)
    }

    pub fn recall_at_k<T: Eq + Hash, S: BuildHasher>(&self, recommended: &[T], relevant: &HashSet<T, S>, k: usize) -> f64 {
        recall_at_k(recommended, relevant, k)
    }

    pub fn average_precision<T: Eq + Hash, S: BuildHasher>(&self, recommended: &[T], relevant: &HashSet<T, S>) -> f64 {
        average_precision(recommended, relevant)
    }

    pub fn ndcg_at_k<T: Eq + Hash, S: BuildHasher>(&self, recommended: &[T], relevant: &HashSet<T, S>, k: usize) -> f64 {
        ndcg_at_k(recommended, relevant, k)
    }

    /// precision/recall/ndcg at every configured K, plus `map`
    pub fn evaluate_all<T, S>(&self, recommended: &[T], relevant: &HashSet<T, S>) -> MetricMap
    where
        T: Eq + Hash,
        S: BuildHasher,
    {
        let mut metrics = MetricMap::new();
        for &k in &self.k_values {
            metrics.insert(format!("precision@{k}"), precision_at_k(recommended, relevant, k));
            metrics.insert(format!("recall@{k}"), recall_at_k(recommended, relevant, k));
            metrics.insert(format!("ndcg@{k}"), ndcg_at_k(recommended, relevant, k));
        }
        metrics.insert("map".to_string(), average_precision(recommended, relevant));
        metrics
    }

    /// Mean of [`RecommendationEvaluator::evaluate_all`] over many queries.
    ///
    /// The `map` entry becomes Mean Average Precision. With no judgments every
    /// metric is 0.0.
    pub fn evaluate_many<T: Eq + Hash>(&self, judgments: &[RelevanceJudgment<T>]) -> MetricMap {
        let nothing: HashSet<T> = HashSet::new();
        let mut totals = self.evaluate_all(&[], &nothing);
        if judgments.is_empty() {
            return totals;
        }

        for judgment in judgments {
            for (name, value) in self.evaluate_all(&judgment.recommended, &judgment.relevant) {
                *totals.entry(name).or_insert(0.0) += value;
            }
        }
        let n = judgments.len() as f64;
        for value in totals.values_mut() {
            *value /= n;
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&'static str]) -> HashSet<&'static str> {
        ids.iter().copied().collect()
    }

    const REC: [&str; 4] = ["A", "B", "C", "D"];

    #[test]
    fn test_precision_recall_example() {
        let relevant = set(&["B", "D"]);
        assert_eq!(precision_at_k(&REC, &relevant, 2), 0.5);
        assert_eq!(recall_at_k(&REC, &relevant, 2), 0.5);
        assert_eq!(precision_at_k(&REC, &relevant, 4), 0.5);
        assert_eq!(recall_at_k(&REC, &relevant, 4), 1.0);
    }

    #[test]
    fn test_degenerate_inputs_score_zero() {
        let relevant = set(&["B"]);
        assert_eq!(precision_at_k(&REC, &relevant, 0), 0.0);
        assert_eq!(precision_at_k::<&str, _>(&[], &relevant, 3), 0.0);
        assert_eq!(recall_at_k(&REC, &set(&[]), 3), 0.0);
        assert_eq!(average_precision(&REC, &set(&[])), 0.0);
        assert_eq!(ndcg_at_k(&REC, &set(&[]), 3), 0.0);
        assert_eq!(ndcg_at_k(&REC, &relevant, 0), 0.0);
    }

    #[test]
    fn test_short_list_is_not_padded() {
        let relevant = set(&["A"]);
        // only one item recommended but k = 5: one hit out of five slots
        assert_eq!(precision_at_k(&["A"], &relevant, 5), 0.2);
        assert_eq!(recall_at_k(&["A"], &relevant, 5), 1.0);
    }

    #[test]
    fn test_average_precision() {
        let relevant = set(&["B", "D"]);
        // hits at ranks 2 and 4: (1/2 + 2/4) / 2
        assert!((average_precision(&REC, &relevant) - 0.5).abs() < 1e-12);

        // a relevant item never recommended still counts in the denominator
        let relevant = set(&["A", "Z"]);
        assert!((average_precision(&REC, &relevant) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ndcg_ideal_ranking_is_one() {
        let relevant = set(&["A", "B"]);
        assert!((ndcg_at_k(&REC, &relevant, 2) - 1.0).abs() < 1e-12);
        assert!((ndcg_at_k(&REC, &relevant, 4) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ndcg_penalizes_late_hits() {
        let relevant = set(&["D"]);
        let expected = (1.0 / 5f64.log2()) / 1.0;
        assert!((ndcg_at_k(&REC, &relevant, 4) - expected).abs() < 1e-12);
        assert_eq!(ndcg_at_k(&REC, &relevant, 3), 0.0);
    }

    #[test]
    fn test_metrics_stay_in_unit_interval() {
        let relevant = set(&["A", "C", "X", "Y", "Z"]);
        for k in 0..8 {
            for value in [
                precision_at_k(&REC, &relevant, k),
                recall_at_k(&REC, &relevant, k),
                ndcg_at_k(&REC, &relevant, k),
            ] {
                assert!((0.0..=1.0).contains(&value), "k={k} value={value}");
            }
        }
    }

    #[test]
    fn test_evaluate_all_keys() {
        let evaluator = RecommendationEvaluator::default();
        let metrics = evaluator.evaluate_all(&REC, &set(&["B", "D"]));
        assert_eq!(metrics.len(), 4 * 3 + 1);
        assert_eq!(metrics["precision@1"], 0.0);
        assert_eq!(metrics["recall@3"], 0.5);
        assert!(metrics.contains_key("ndcg@10"));
        assert!((metrics["map"] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_many_averages() {
        let evaluator = RecommendationEvaluator::new(vec![1]);
        let judgments = vec![
            RelevanceJudgment::new(vec!["A", "B"], ["A"]),
            RelevanceJudgment::new(vec!["A", "B"], ["B"]),
        ];
        let metrics = evaluator.evaluate_many(&judgments);
        assert_eq!(metrics["precision@1"], 0.5);
        assert_eq!(metrics["recall@1"], 0.5);
        // AP: 1.0 and 0.5
        assert!((metrics["map"] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_many_empty() {
        let metrics = RecommendationEvaluator::default().evaluate_many::<String>(&[]);
        assert_eq!(metrics.len(), 13);
        assert!(metrics.values().all(|&v| v == 0.0));
    }

    #[test]
    fn test_judgment_from_json() {
        let judgment: RelevanceJudgment<String> =
            serde_json::from_str(r#"{"recommended": ["1", "2"], "relevant": ["2"]}"#).unwrap();
        assert_eq!(recall_at_k(&judgment.recommended, &judgment.relevant, 2), 1.0);
    }
}
