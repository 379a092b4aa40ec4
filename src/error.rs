use thiserror::Error;

/// Raised when a stream buffer cannot be built from the supplied words
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("cannot build a text buffer from an empty word list")]
    Empty,
}

/// Failure modes of a prompt source. Never surfaced to the user: the
/// controller swaps in the built-in text instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("prompt source returned no text")]
    Empty,
    #[error("prompt source unavailable: {0}")]
    Unavailable(String),
    #[error("word list could not be loaded: {0}")]
    WordList(#[from] serde_json::Error),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unsupported time limit {0}s (expected one of 15, 30, 60, 120)")]
pub struct TimeLimitError(pub u64);
