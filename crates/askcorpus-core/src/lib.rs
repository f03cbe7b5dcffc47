//! # askcorpus core
//!
//! Shared building blocks for the askcorpus workspace: the error enum,
//! the TOML configuration system, and the traits that abstract the
//! remote embedding and completion providers so the retrieval core can
//! be tested against deterministic stubs.

pub mod config;
pub mod error;
pub mod traits;

pub use config::AskCorpusConfig;
pub use error::{AskCorpusError, Result};
pub use traits::{CompletionBackend, EmbeddingBackend};
