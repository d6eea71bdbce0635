use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Product not found: {0}")]
    ProductNotFound(u64),

    #[error("Duplicate product id: {0}")]
    DuplicateProduct(u64),

    #[error("Invalid product {id}: {reason}")]
    InvalidProduct { id: u64, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
