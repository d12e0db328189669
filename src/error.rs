//! Error types for the chunking engine.

use thiserror::Error;

/// Errors surfaced by the chunking engine.
///
/// Configuration errors are raised before any text is touched, so a single
/// chunking run either completes or never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// Invalid combination of chunking parameters.
    #[error("Invalid chunk configuration: {0}")]
    Configuration(String),

    /// Strategy identifier that does not name a known strategy.
    #[error("Unsupported chunking strategy: {0}. Use: recursive, semantic, markdown, sentence, fixed")]
    UnsupportedStrategy(String),

    /// A batch task failed and the batch was configured to stop on errors.
    #[error("Batch processing failed: {0}")]
    Batch(String),
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ChunkError>;
