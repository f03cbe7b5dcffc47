//! Backend traits at the process boundary.
//!
//! The embedding call and the completion call are the only operations
//! that cross the network. Both sit behind narrow traits so the
//! retrieval core can be exercised with deterministic in-memory stubs.

use async_trait::async_trait;

use crate::error::Result;

/// Remote embedding provider.
///
/// Implementations return RAW vectors straight from the provider, one
/// per input text, order-preserving. Normalization is the caller's job
/// (see `Embedder` in askcorpus-retrieval), keeping provider adapters
/// dumb pipes.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Embed a batch of texts in a single provider call.
    ///
    /// Any provider or network failure must surface as an error, never
    /// as a silently empty result.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Remote language-model completion provider.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Single-shot completion for a fully built prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
