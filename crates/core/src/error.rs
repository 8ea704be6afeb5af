//! Error types for the BPE tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Vocabulary or merges text is empty or malformed
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pre-tokenization pattern failed to compile or match
    #[error("Regex error: {0}")]
    Regex(#[from] fancy_regex::Error),

    /// A precondition inside the tokenization pipeline was violated
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Caller-provided output buffer has the wrong length
    #[error("Output buffer holds {actual} elements, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
