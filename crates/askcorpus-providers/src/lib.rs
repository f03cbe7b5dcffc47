//! # askcorpus providers
//!
//! Remote provider adapters. A single [`OpenAiCompatibleClient`] covers
//! every OpenAI-compatible API (OpenRouter by default) for both the
//! embeddings endpoint and the chat-completions endpoint; the two
//! concerns are exposed through the narrow `EmbeddingBackend` and
//! `CompletionBackend` traits from askcorpus-core.

pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleClient;
