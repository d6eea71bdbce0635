//! Advisory pre-flight checks for tabular data and embeddings
//!
//! Validation never fails: problems end up in the report. `issues` make a
//! report invalid, `warnings` do not.

use crate::{EmbeddingMatrix, EvalError, Result};
use ahash::AHashSet;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Column variance below this counts as a collapsed dimension
pub const LOW_VARIANCE_THRESHOLD: f64 = 1e-6;

/// Missing-value share above which a column gets a warning, in percent
pub const MISSING_WARNING_PERCENT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport<S> {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: S,
}

impl<S> ValidationReport<S> {
    fn new(stats: S) -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
            warnings: Vec::new(),
            stats,
        }
    }

    fn issue(&mut self, message: String) {
        warn!(issue = %message, "Validation issue");
        self.is_valid = false;
        self.issues.push(message);
    }

    fn warning(&mut self, message: String) {
        warn!(warning = %message, "Validation warning");
        self.warnings.push(message);
    }
}

/// Named columns over rows of JSON values; `Value::Null` is a missing value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Append a row; short rows are padded with nulls, extra cells dropped
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Build from JSON objects. Columns are the union of keys in first-seen
    /// order; absent keys become nulls.
    pub fn from_records(records: &[Value]) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or(EvalError::NotARecord(i))?;
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Self::new(columns);
        for record in records {
            if let Some(object) = record.as_object() {
                let row = table
                    .columns
                    .iter()
                    .map(|c| object.get(c).cloned().unwrap_or(Value::Null))
                    .collect();
                table.rows.push(row);
            }
        }
        Ok(table)
    }

    /// Parse a JSON array of objects without interpreting the fields
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<Value> = serde_json::from_str(json)?;
        Self::from_records(&records)
    }

    /// Serialize each item and tabulate the resulting objects
    pub fn from_serialize<T: Serialize>(items: &[T]) -> Result<Self> {
        let records = items
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::from_records(&records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissingValues {
    pub count: usize,
    /// Rounded to 2 decimals
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableStats {
    pub total_rows: usize,
    pub total_columns: usize,
    pub duplicate_rows: usize,
    /// Only columns with at least one missing value
    pub missing_values: BTreeMap<String, MissingValues>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmbeddingStats {
    pub rows: usize,
    pub dims: usize,
    pub nan_values: usize,
    pub inf_values: usize,
    pub zero_vectors: usize,
    pub low_variance_dims: usize,
}

/// Check required columns, emptiness, duplicate rows and missing values
pub fn validate_table(table: &Table, required_columns: &[&str]) -> ValidationReport<TableStats> {
    let mut report = ValidationReport::new(TableStats {
        total_rows: table.len(),
        total_columns: table.columns.len(),
        ..TableStats::default()
    });

    let missing: Vec<&str> = required_columns
        .iter()
        .copied()
        .filter(|c| !table.columns.iter().any(|col| col == c))
        .collect();
    if !missing.is_empty() {
        report.issue(format!("Missing columns: {missing:?}"));
    }

    if table.is_empty() {
        report.issue("Table is empty".to_string());
        return report;
    }

    let mut seen = AHashSet::with_capacity(table.len());
    let duplicates = table
        .rows
        .iter()
        .filter(|row| !seen.insert(Value::Array(row.to_vec()).to_string()))
        .count();
    report.stats.duplicate_rows = duplicates;
    if duplicates > 0 {
        report.warning(format!("Found {duplicates} duplicate rows"));
    }

    let n = table.len() as f64;
    for (c, column) in table.columns.iter().enumerate() {
        let count = table.rows.iter().filter(|row| row[c].is_null()).count();
        if count == 0 {
            continue;
        }
        let pct = count as f64 / n * 100.0;
        report.stats.missing_values.insert(
            column.clone(),
            MissingValues {
                count,
                percentage: (pct * 100.0).round() / 100.0,
            },
        );
        if pct > MISSING_WARNING_PERCENT {
            report.warning(format!("Column '{column}' has {pct:.1}% missing values"));
        }
    }

    report
}

/// Check for non-finite values, all-zero rows and collapsed dimensions
pub fn validate_embeddings(embeddings: &EmbeddingMatrix) -> ValidationReport<EmbeddingStats> {
    let mut report = ValidationReport::new(EmbeddingStats {
        rows: embeddings.n_rows(),
        dims: embeddings.dim(),
        ..EmbeddingStats::default()
    });

    if embeddings.is_empty() {
        report.issue("Embedding matrix is empty".to_string());
        return report;
    }

    let values = embeddings.as_slice();
    let nan_values = values.iter().filter(|x| x.is_nan()).count();
    let inf_values = values.iter().filter(|x| x.is_infinite()).count();
    report.stats.nan_values = nan_values;
    report.stats.inf_values = inf_values;
    if nan_values > 0 {
        report.issue("Embeddings contain NaN values".to_string());
    }
    if inf_values > 0 {
        report.issue("Embeddings contain Inf values".to_string());
    }

    let zero_vectors = embeddings.rows().filter(|row| row.iter().all(|&x| x == 0.0)).count();
    report.stats.zero_vectors = zero_vectors;
    if zero_vectors > 0 {
        let pct = zero_vectors as f64 / embeddings.n_rows() as f64 * 100.0;
        report.warning(format!("{zero_vectors} ({pct:.1}%) zero vectors found"));
    }

    let low_variance = embeddings
        .column_variances()
        .into_iter()
        .filter(|&v| v < LOW_VARIANCE_THRESHOLD)
        .count();
    report.stats.low_variance_dims = low_variance;
    if low_variance > 0 && embeddings.dim() > 0 {
        let pct = low_variance as f64 / embeddings.dim() as f64 * 100.0;
        report.warning(format!("{low_variance} ({pct:.1}%) dimensions have very low variance"));
    }

    report
}
