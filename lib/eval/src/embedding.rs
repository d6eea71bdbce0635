//! Embedding-space diagnostics
//!
//! - **Diversity**: distribution of pairwise cosine similarities. Values
//!   crowding near 1.0 mean the embeddings collapsed and items are hard to
//!   tell apart.
//! - **Cluster separation**: silhouette and Davies-Bouldin scores plus
//!   centroid distances for labeled embeddings.
//! - **Fusion**: combine text and image embeddings into one representation.
//!
//! Diversity costs O(sample^2 x D); cluster separation costs O(N^2 x D).
//! Both spread rows over the rayon pool.

use crate::distance::{cosine_with_norms, euclidean_distance, norm, normalized};
use crate::{EmbeddingMatrix, EvalError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Rows compared by default in [`EmbeddingAnalyzer::diversity`]
pub const DEFAULT_DIVERSITY_SAMPLE_SIZE: usize = 1000;

/// Summary of off-diagonal pairwise cosine similarities
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiversityStats {
    pub mean_similarity: f64,
    /// Population standard deviation
    pub std_similarity: f64,
    pub min_similarity: f64,
    pub max_similarity: f64,
    pub median_similarity: f64,
    pub q25_similarity: f64,
    pub q75_similarity: f64,
    /// Rows that took part after sampling
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterCentroid {
    pub label: i64,
    pub size: usize,
    pub centroid: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSeparation {
    /// In [-1, 1], higher is better
    pub silhouette_score: f64,
    /// Lower is better
    pub davies_bouldin_score: f64,
    pub n_clusters: usize,
    /// Mean over the full centroid distance matrix, diagonal included
    pub mean_inter_cluster_distance: f64,
    /// Smallest strictly positive centroid distance; 0.0 if all centroids coincide
    pub min_inter_cluster_distance: f64,
    /// Sorted by label
    pub centroids: Vec<ClusterCentroid>,
}

/// Weights for combining text and image embeddings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub text: f32,
    pub image: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { text: 0.7, image: 0.3 }
    }
}

/// Embedding diagnostics with a fixed sample size and optional RNG seed
#[derive(Debug, Clone)]
pub struct EmbeddingAnalyzer {
    sample_size: usize,
    seed: Option<u64>,
}

impl Default for EmbeddingAnalyzer {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_DIVERSITY_SAMPLE_SIZE,
            seed: None,
        }
    }
}

impl EmbeddingAnalyzer {
    pub fn new(sample_size: usize) -> Self {
        Self { sample_size, seed: None }
    }

    /// Fix the sampling seed so diversity results are reproducible
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn diversity(&self, embeddings: &EmbeddingMatrix) -> Result<DiversityStats> {
        diversity(embeddings, self.sample_size, self.seed)
    }

    pub fn cluster_separation(&self, embeddings: &EmbeddingMatrix, labels: &[i64]) -> Result<ClusterSeparation> {
        cluster_separation(embeddings, labels)
    }
}

/// Pairwise cosine-similarity statistics over at most `sample_size` rows.
///
/// Larger matrices are sampled uniformly without replacement. Without a
/// `seed` the sample is drawn from OS entropy and differs between calls.
pub fn diversity(embeddings: &EmbeddingMatrix, sample_size: usize, seed: Option<u64>) -> Result<DiversityStats> {
    let sampled;
    let sample = if embeddings.n_rows() > sample_size {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let indices = rand::seq::index::sample(&mut rng, embeddings.n_rows(), sample_size).into_vec();
        sampled = embeddings.select_rows(&indices);
        &sampled
    } else {
        embeddings
    };

    let n = sample.n_rows();
    if n < 2 {
        return Err(EvalError::TooFewRows { required: 2, actual: n });
    }

    let norms: Vec<f32> = sample.rows().map(norm).collect();
    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let a = sample.row(i);
            (0..n)
                .filter(|&j| j != i)
                .map(|j| cosine_with_norms(a, norms[i], sample.row(j), norms[j]) as f64)
                .collect()
        })
        .collect();
    let mut similarities: Vec<f64> = rows.into_iter().flatten().collect();
    similarities.sort_by(f64::total_cmp);

    let count = similarities.len() as f64;
    let mean = similarities.iter().sum::<f64>() / count;
    let variance = similarities.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / count;

    debug!(rows = embeddings.n_rows(), sample = n, mean, "Diversity computed");

    Ok(DiversityStats {
        mean_similarity: mean,
        std_similarity: variance.sqrt(),
        min_similarity: similarities[0],
        max_similarity: similarities[similarities.len() - 1],
        median_similarity: percentile(&similarities, 50.0),
        q25_similarity: percentile(&similarities, 25.0),
        q75_similarity: percentile(&similarities, 75.0),
        sample_size: n,
    })
}

/// Linear-interpolation percentile of sorted, non-empty values
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Separation diagnostics for labeled embeddings.
///
/// Needs at least 2 distinct labels and fewer labels than rows.
pub fn cluster_separation(embeddings: &EmbeddingMatrix, labels: &[i64]) -> Result<ClusterSeparation> {
    if labels.len() != embeddings.n_rows() {
        return Err(EvalError::LabelMismatch {
            expected: embeddings.n_rows(),
            actual: labels.len(),
        });
    }

    let mut members: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        members.entry(label).or_default().push(i);
    }
    if members.len() < 2 {
        return Err(EvalError::TooFewClusters(members.len()));
    }
    if members.len() == labels.len() {
        return Err(EvalError::TooManyClusters {
            clusters: members.len(),
            rows: labels.len(),
        });
    }

    let clusters: Vec<&Vec<usize>> = members.values().collect();
    let centroids: Vec<ClusterCentroid> = members
        .iter()
        .map(|(&label, idx)| ClusterCentroid {
            label,
            size: idx.len(),
            centroid: embeddings.mean_of(idx),
        })
        .collect();

    let k = centroids.len();
    let mut centroid_distances = vec![vec![0.0f64; k]; k];
    for a in 0..k {
        for b in (a + 1)..k {
            let d = euclidean_distance(&centroids[a].centroid, &centroids[b].centroid) as f64;
            centroid_distances[a][b] = d;
            centroid_distances[b][a] = d;
        }
    }

    let silhouette = silhouette_score(embeddings, &clusters);
    let davies_bouldin = davies_bouldin_score(embeddings, &clusters, &centroids, &centroid_distances);

    let all: Vec<f64> = centroid_distances.iter().flatten().copied().collect();
    let mean_inter = all.iter().sum::<f64>() / all.len() as f64;
    let min_inter = all
        .iter()
        .copied()
        .filter(|&d| d > 0.0)
        .min_by(f64::total_cmp)
        .unwrap_or(0.0);

    debug!(clusters = k, silhouette, davies_bouldin, "Cluster separation computed");

    Ok(ClusterSeparation {
        silhouette_score: silhouette,
        davies_bouldin_score: davies_bouldin,
        n_clusters: k,
        mean_inter_cluster_distance: mean_inter,
        min_inter_cluster_distance: min_inter,
        centroids,
    })
}

/// Mean silhouette over all points; points alone in their cluster count 0
fn silhouette_score(embeddings: &EmbeddingMatrix, clusters: &[&Vec<usize>]) -> f64 {
    let mut owner = vec![0usize; embeddings.n_rows()];
    for (c, idx) in clusters.iter().enumerate() {
        for &i in idx.iter() {
            owner[i] = c;
        }
    }

    let mean_distance = |i: usize, idx: &[usize]| -> (f64, usize) {
        let point = embeddings.row(i);
        let mut sum = 0.0;
        let mut count = 0;
        for &j in idx {
            if j != i {
                sum += euclidean_distance(point, embeddings.row(j)) as f64;
                count += 1;
            }
        }
        (sum, count)
    };

    let total: f64 = (0..embeddings.n_rows())
        .into_par_iter()
        .map(|i| {
            let own = owner[i];
            let (sum, count) = mean_distance(i, clusters[own]);
            if count == 0 {
                return 0.0;
            }
            let a = sum / count as f64;
            let b = clusters
                .iter()
                .enumerate()
                .filter(|&(c, _)| c != own)
                .map(|(_, idx)| {
                    let (sum, count) = mean_distance(i, idx);
                    sum / count as f64
                })
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            if denom == 0.0 {
                0.0
            } else {
                (b - a) / denom
            }
        })
        .sum();

    total / embeddings.n_rows() as f64
}

/// Mean over clusters of the worst (S_i + S_j) / d(c_i, c_j) ratio.
///
/// S is the mean distance of a cluster's points to its centroid. Coinciding
/// centroids contribute a ratio of 0.
fn davies_bouldin_score(
    embeddings: &EmbeddingMatrix,
    clusters: &[&Vec<usize>],
    centroids: &[ClusterCentroid],
    centroid_distances: &[Vec<f64>],
) -> f64 {
    let scatter: Vec<f64> = clusters
        .iter()
        .zip(centroids)
        .map(|(idx, c)| {
            let sum: f64 = idx
                .iter()
                .map(|&i| euclidean_distance(embeddings.row(i), &c.centroid) as f64)
                .sum();
            sum / idx.len() as f64
        })
        .collect();

    let k = clusters.len();
    let worst: f64 = (0..k)
        .map(|a| {
            (0..k)
                .filter(|&b| b != a)
                .map(|b| {
                    let d = centroid_distances[a][b];
                    if d == 0.0 {
                        0.0
                    } else {
                        (scatter[a] + scatter[b]) / d
                    }
                })
                .fold(0.0, f64::max)
        })
        .sum();

    worst / k as f64
}

/// Concatenate L2-normalized text and image rows scaled by their weights.
///
/// The result has `text.dim() + image.dim()` columns.
pub fn fuse(text: &EmbeddingMatrix, image: &EmbeddingMatrix, weights: FusionWeights) -> Result<EmbeddingMatrix> {
    if text.n_rows() != image.n_rows() {
        return Err(EvalError::RowCountMismatch {
            text: text.n_rows(),
            image: image.n_rows(),
        });
    }

    let dim = text.dim() + image.dim();
    let mut data = Vec::with_capacity(text.n_rows() * dim);
    for (t, i) in text.rows().zip(image.rows()) {
        data.extend(normalized(t).into_iter().map(|x| x * weights.text));
        data.extend(normalized(i).into_iter().map(|x| x * weights.image));
    }
    EmbeddingMatrix::new(text.n_rows(), dim, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f32>>) -> EmbeddingMatrix {
        EmbeddingMatrix::from_rows(rows).unwrap()
    }

    fn two_blobs() -> EmbeddingMatrix {
        matrix(vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![5.0, 5.0],
            vec![5.1, 5.1],
        ])
    }

    #[test]
    fn test_identical_embeddings_have_similarity_one() {
        let m = matrix(vec![vec![1.0, 2.0]; 4]);
        let stats = diversity(&m, 100, None).unwrap();
        assert!((stats.mean_similarity - 1.0).abs() < 1e-6);
        assert!(stats.std_similarity < 1e-6);
        assert_eq!(stats.sample_size, 4);
    }

    #[test]
    fn test_orthogonal_embeddings() {
        let m = matrix(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]);
        let stats = diversity(&m, 100, None).unwrap();
        assert!(stats.mean_similarity.abs() < 1e-6);
        assert!(stats.max_similarity.abs() < 1e-6);
    }

    #[test]
    fn test_diversity_percentiles() {
        // similarities: (a,b)=1, (a,c)=0, (b,c)=0, each counted twice
        let m = matrix(vec![vec![1.0, 0.0], vec![2.0, 0.0], vec![0.0, 1.0]]);
        let stats = diversity(&m, 100, None).unwrap();
        assert!((stats.mean_similarity - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(stats.min_similarity, 0.0);
        assert!((stats.max_similarity - 1.0).abs() < 1e-6);
        assert_eq!(stats.median_similarity, 0.0);
        // sorted [0,0,0,0,1,1]: q75 at position 3.75
        assert!((stats.q75_similarity - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let rows: Vec<Vec<f32>> = (0..50)
            .map(|i| vec![(i as f32).sin(), (i as f32).cos(), i as f32 / 50.0])
            .collect();
        let m = matrix(rows);
        let analyzer = EmbeddingAnalyzer::new(10).with_seed(42);
        let first = analyzer.diversity(&m).unwrap();
        let second = analyzer.diversity(&m).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.sample_size, 10);
    }

    #[test]
    fn test_diversity_needs_two_rows() {
        let m = matrix(vec![vec![1.0, 0.0]]);
        assert_eq!(
            diversity(&m, 10, None).unwrap_err(),
            EvalError::TooFewRows { required: 2, actual: 1 }
        );
    }

    #[test]
    fn test_cluster_separation_well_separated() {
        let result = cluster_separation(&two_blobs(), &[0, 0, 1, 1]).unwrap();
        assert_eq!(result.n_clusters, 2);
        assert!(result.silhouette_score > 0.9);
        assert!(result.davies_bouldin_score < 0.1);

        let expected = (2.0f64 * 5.0 * 5.0).sqrt();
        assert!((result.min_inter_cluster_distance - expected).abs() < 1e-4);
        // 2x2 matrix with zero diagonal
        assert!((result.mean_inter_cluster_distance - expected / 2.0).abs() < 1e-4);
        assert_eq!(result.centroids[0].label, 0);
        assert_eq!(result.centroids[1].size, 2);
    }

    #[test]
    fn test_cluster_separation_needs_two_labels() {
        let err = cluster_separation(&two_blobs(), &[3, 3, 3, 3]).unwrap_err();
        assert_eq!(err, EvalError::TooFewClusters(1));
    }

    #[test]
    fn test_every_row_its_own_cluster_rejected() {
        let err = cluster_separation(&two_blobs(), &[0, 1, 2, 3]).unwrap_err();
        assert_eq!(err, EvalError::TooManyClusters { clusters: 4, rows: 4 });
    }

    #[test]
    fn test_label_length_checked() {
        let err = cluster_separation(&two_blobs(), &[0, 1]).unwrap_err();
        assert_eq!(err, EvalError::LabelMismatch { expected: 4, actual: 2 });
    }

    #[test]
    fn test_coinciding_centroids() {
        let m = matrix(vec![vec![1.0, 0.0], vec![-1.0, 0.0], vec![0.0, 1.0], vec![0.0, -1.0]]);
        let result = cluster_separation(&m, &[0, 0, 1, 1]).unwrap();
        assert_eq!(result.min_inter_cluster_distance, 0.0);
        assert_eq!(result.davies_bouldin_score, 0.0);
    }

    #[test]
    fn test_singleton_cluster_silhouette() {
        let m = matrix(vec![vec![0.0], vec![1.0], vec![10.0]]);
        let result = cluster_separation(&m, &[0, 0, 1]).unwrap();
        // points 0 and 1 are well placed, the singleton contributes 0
        assert!(result.silhouette_score > 0.5 && result.silhouette_score < 1.0);
    }

    #[test]
    fn test_fuse_weights_and_normalizes() {
        let text = matrix(vec![vec![3.0, 4.0]]);
        let image = matrix(vec![vec![0.0, 0.0, 2.0]]);
        let fused = fuse(&text, &image, FusionWeights::default()).unwrap();
        assert_eq!(fused.dim(), 5);
        let row = fused.row(0);
        assert!((row[0] - 0.6 * 0.7).abs() < 1e-6);
        assert!((row[1] - 0.8 * 0.7).abs() < 1e-6);
        assert!((row[4] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_fuse_row_mismatch() {
        let text = matrix(vec![vec![1.0], vec![2.0]]);
        let image = matrix(vec![vec![1.0]]);
        assert_eq!(
            fuse(&text, &image, FusionWeights::default()).unwrap_err(),
            EvalError::RowCountMismatch { text: 2, image: 1 }
        );
    }
}
