use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key error on index {index}")]
    DuplicateKey { index: String },

    #[error("unsupported operator {0:?}")]
    UnsupportedOperator(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("collection {0:?} already exists")]
    CollectionExists(String),

    #[error("index {0:?} already exists with different options")]
    IndexConflict(String),

    #[error("invalid store uri {0:?}, expected memory:// or file://<dir>")]
    InvalidUri(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
