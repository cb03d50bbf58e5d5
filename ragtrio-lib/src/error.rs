//! Error types for ragtrio

use thiserror::Error;

/// Result type alias for ragtrio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ragtrio operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing credential or invalid parameter, fatal at startup
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to read or parse the source document
    #[error("loading error: {0}")]
    Loading(String),

    /// Embedding service call failed or returned malformed data
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Failed to store or retrieve from vector store
    #[error("store error: {0}")]
    Store(String),

    /// Rerank service call failed or returned malformed data
    #[error("reranking error: {0}")]
    Reranking(String),

    /// Chat completion call failed
    #[error("generation error: {0}")]
    Generation(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
