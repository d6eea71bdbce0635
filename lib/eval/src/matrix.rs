use crate::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// Dense N x D embedding matrix, row-major
///
/// Row `i` is the embedding of item `i`. Rows always share one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f32>>", into = "Vec<Vec<f32>>")]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Wrap row-major data, checking that it holds `rows * dim` values
    pub fn new(rows: usize, dim: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * dim {
            return Err(EvalError::InvalidShape { rows, dim, actual: data.len() });
        }
        Ok(Self { data, rows, dim })
    }

    /// Build from nested rows; every row must have the first row's length
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        let n = rows.len();
        let mut data = Vec::with_capacity(n * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(EvalError::InvalidDimension { row: i, expected: dim, actual: row.len() });
            }
            data.extend(row);
        }
        Ok(Self { data, rows: n, dim })
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Row `i`; panics when out of range like slice indexing
    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// New matrix holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.dim);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self { data, rows: indices.len(), dim: self.dim }
    }

    /// Population variance of every column, accumulated in f64
    pub fn column_variances(&self) -> Vec<f64> {
        if self.rows == 0 {
            return vec![0.0; self.dim];
        }
        let n = self.rows as f64;
        let mut means = vec![0.0f64; self.dim];
        for row in self.rows() {
            for (m, &x) in means.iter_mut().zip(row) {
                *m += x as f64;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut variances = vec![0.0f64; self.dim];
        for row in self.rows() {
            for ((v, &x), m) in variances.iter_mut().zip(row).zip(&means) {
                let d = x as f64 - m;
                *v += d * d;
            }
        }
        for v in &mut variances {
            *v /= n;
        }
        variances
    }

    /// Mean of the given rows
    pub fn mean_of(&self, indices: &[usize]) -> Vec<f32> {
        let mut sums = vec![0.0f64; self.dim];
        for &i in indices {
            for (s, &x) in sums.iter_mut().zip(self.row(i)) {
                *s += x as f64;
            }
        }
        let n = indices.len().max(1) as f64;
        sums.into_iter().map(|s| (s / n) as f32).collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.rows().map(<[f32]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<f32>>> for EmbeddingMatrix {
    type Error = EvalError;

    fn try_from(rows: Vec<Vec<f32>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<EmbeddingMatrix> for Vec<Vec<f32>> {
    fn from(matrix: EmbeddingMatrix) -> Self {
        matrix.to_rows()
    }
}
