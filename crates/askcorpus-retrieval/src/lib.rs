//! # askcorpus retrieval
//!
//! The indexing and similarity-search core: splitting a source document
//! into overlapping word windows, normalizing provider embeddings,
//! building an exact flat L2 index, persisting the index/chunk pair,
//! and answering top-k nearest-chunk queries.
//!
//! ```text
//! offline:  source text → chunker → embedder → FlatIndex → artifacts
//! online:   query → embedder → FlatIndex::search → chunk lookup
//! ```
//!
//! The two artifacts (vector index, chunk-text list) are keyed by
//! position: entry i in the index corresponds to entry i in the chunk
//! list. That invariant is checked at load time and violation is fatal.

pub mod builder;
pub mod chunker;
pub mod embedder;
pub mod index;
pub mod store;

pub use builder::{BuildOutcome, build_index};
pub use embedder::Embedder;
pub use index::FlatIndex;
pub use store::{DEFAULT_K, SearchHit, VectorStore};
