//! Error types shared across the workspace.
//!
//! Every error falls into one of a handful of categories so the
//! transport layer can map them to distinguishable responses: bad
//! configuration, a failing retrieval backend, a corrupted artifact
//! pair, or a failing completion provider.

use thiserror::Error;

/// Workspace-wide error enum.
#[derive(Debug, Error)]
pub enum AskCorpusError {
    /// Invalid configuration: bad chunk size/overlap relationship,
    /// unparseable config file, malformed artifact header.
    #[error("configuration error: {0}")]
    Config(String),

    /// The embedding provider call failed or returned malformed data
    /// (wrong shape, row count mismatch, zero-norm vector).
    #[error("retrieval backend error: {0}")]
    RetrievalBackend(String),

    /// Index cardinality and chunk-list cardinality disagree.
    #[error("inconsistent store: {0}")]
    InconsistentStore(String),

    /// A required on-disk artifact is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The language-model completion call failed.
    #[error("completion error: {0}")]
    UpstreamCompletion(String),

    /// No API key available for a provider that requires one.
    #[error("API key missing for provider '{0}'")]
    ApiKeyMissing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AskCorpusError>;
