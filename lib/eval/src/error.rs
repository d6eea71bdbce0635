use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvalError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Invalid vector dimension in row {row}: expected {expected}, got {actual}")]
    InvalidDimension { row: usize, expected: usize, actual: usize },

    #[error("Matrix data length {actual} does not match {rows}x{dim}")]
    InvalidShape { rows: usize, dim: usize, actual: usize },

    #[error("Label count mismatch: expected {expected}, got {actual}")]
    LabelMismatch { expected: usize, actual: usize },

    #[error("Need at least 2 clusters, got {0}")]
    TooFewClusters(usize),

    #[error("{clusters} clusters over {rows} rows: need fewer clusters than rows")]
    TooManyClusters { clusters: usize, rows: usize },

    #[error("Need at least {required} rows, got {actual}")]
    TooFewRows { required: usize, actual: usize },

    #[error("Row count mismatch: text has {text} rows, image has {image}")]
    RowCountMismatch { text: usize, image: usize },

    #[error("Record {0} is not a JSON object")]
    NotARecord(usize),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EvalError {
    fn from(e: serde_json::Error) -> Self {
        EvalError::Serialization(e.to_string())
    }
}
