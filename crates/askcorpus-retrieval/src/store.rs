//! Read-only vector store.
//!
//! Loads the persisted index/chunk-list pair, validates their
//! cardinalities match, and serves top-k similarity searches. A loaded
//! store is immutable; share it behind an `Arc` and query it from any
//! number of tasks. Rebuilding the index requires a fresh load.

use askcorpus_core::error::{AskCorpusError, Result};
use askcorpus_core::traits::EmbeddingBackend;
use std::path::Path;

use crate::embedder::Embedder;
use crate::index::FlatIndex;

/// Vector index artifact filename.
pub const INDEX_FILE: &str = "index.bin";

/// Chunk-text list artifact filename.
pub const CHUNKS_FILE: &str = "chunks.json";

/// Result-set size used when a caller does not pick one.
pub const DEFAULT_K: usize = 3;

/// One retrieved chunk with its squared L2 distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub distance: f32,
}

/// In-memory read-only copy of the two on-disk artifacts.
pub struct VectorStore {
    index: FlatIndex,
    chunks: Vec<String>,
}

impl VectorStore {
    /// Load both artifacts from `dir`.
    ///
    /// Fails with `NotFound` if either file is missing and with
    /// `InconsistentStore` if the index cardinality does not match the
    /// chunk-list length. Misalignment is never silently repaired.
    pub fn load(dir: &Path) -> Result<Self> {
        let index_path = dir.join(INDEX_FILE);
        let chunks_path = dir.join(CHUNKS_FILE);

        if !index_path.exists() {
            return Err(AskCorpusError::NotFound(format!(
                "vector index not found: {}",
                index_path.display()
            )));
        }
        if !chunks_path.exists() {
            return Err(AskCorpusError::NotFound(format!(
                "chunk list not found: {}",
                chunks_path.display()
            )));
        }

        let index = FlatIndex::read_file(&index_path)?;

        let chunks_raw = std::fs::read(&chunks_path)?;
        let chunks: Vec<String> = serde_json::from_slice(&chunks_raw)
            .map_err(|e| AskCorpusError::Config(format!("failed to parse chunk list: {e}")))?;

        if index.len() != chunks.len() {
            return Err(AskCorpusError::InconsistentStore(format!(
                "index has {} vectors but chunk list has {} entries",
                index.len(),
                chunks.len()
            )));
        }

        tracing::debug!(
            count = chunks.len(),
            dim = index.dim(),
            "loaded vector store"
        );
        Ok(Self { index, chunks })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Embedding dimension of the loaded index.
    pub fn dim(&self) -> usize {
        self.index.dim()
    }

    /// The ordered chunk texts, position-aligned with the index.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Retrieve the `k` chunks nearest to `query`, ascending by
    /// squared L2 distance.
    ///
    /// An empty or whitespace-only query returns an empty result. If
    /// `k` exceeds the index cardinality, all available hits are
    /// returned with no padding.
    pub async fn similarity_search(
        &self,
        backend: &dyn EmbeddingBackend,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = Embedder::new(backend).embed_one(query).await?;
        let neighbors = self.index.search(&query_vec, k)?;

        Ok(neighbors
            .into_iter()
            .map(|(pos, distance)| SearchHit {
                text: self.chunks[pos].clone(),
                distance,
            })
            .collect())
    }

    /// [`similarity_search`](Self::similarity_search) with [`DEFAULT_K`] hits.
    pub async fn similarity_search_default(
        &self,
        backend: &dyn EmbeddingBackend,
        query: &str,
    ) -> Result<Vec<SearchHit>> {
        self.similarity_search(backend, query, DEFAULT_K).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Stub that maps known texts to fixed raw vectors.
    struct StubBackend;

    #[async_trait]
    impl EmbeddingBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            texts
                .iter()
                .map(|t| match t.as_str() {
                    "chunk0" | "east" => Ok(vec![1.0, 0.0]),
                    "chunk1" => Ok(vec![0.0, 1.0]),
                    "chunk2" => Ok(vec![0.7, 0.7]),
                    other => Err(AskCorpusError::RetrievalBackend(format!(
                        "unexpected text: {other}"
                    ))),
                })
                .collect()
        }
    }

    /// Persist a handmade index/chunk pair and return the directory.
    fn write_store(vectors: &[Vec<f32>], chunks: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut index = FlatIndex::new(vectors[0].len()).unwrap();
        index.add_batch(vectors).unwrap();

        let file = std::fs::File::create(dir.path().join(INDEX_FILE)).unwrap();
        let mut writer = std::io::BufWriter::new(file);
        index.write_to(&mut writer).unwrap();
        use std::io::Write;
        writer.flush().unwrap();

        let texts: Vec<String> = chunks.iter().map(|s| s.to_string()).collect();
        std::fs::write(
            dir.path().join(CHUNKS_FILE),
            serde_json::to_vec(&texts).unwrap(),
        )
        .unwrap();
        dir
    }

    fn three_chunk_store() -> tempfile::TempDir {
        write_store(
            &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
            &["chunk0", "chunk1", "chunk2"],
        )
    }

    #[tokio::test]
    async fn test_search_known_embeddings_ordering() {
        let dir = three_chunk_store();
        let store = VectorStore::load(dir.path()).unwrap();

        let hits = store.similarity_search(&StubBackend, "east", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "chunk0");
        assert_eq!(hits[1].text, "chunk2");
        assert!(hits[0].distance < hits[1].distance);

        let all = store.similarity_search(&StubBackend, "east", 3).await.unwrap();
        assert_eq!(all[2].text, "chunk1");
        assert!(all[1].distance < all[2].distance);
    }

    #[tokio::test]
    async fn test_empty_query_returns_empty() {
        let dir = three_chunk_store();
        let store = VectorStore::load(dir.path()).unwrap();
        for q in ["", "   ", "\n\t"] {
            let hits = store.similarity_search(&StubBackend, q, 5).await.unwrap();
            assert!(hits.is_empty());
        }
    }

    #[tokio::test]
    async fn test_search_default_k_is_three() {
        let dir = write_store(
            &[
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.7, 0.7],
                vec![0.5, 0.5],
                vec![0.1, 0.9],
            ],
            &["chunk0", "chunk1", "chunk2", "chunk3", "chunk4"],
        );
        let store = VectorStore::load(dir.path()).unwrap();
        let hits = store
            .similarity_search_default(&StubBackend, "east")
            .await
            .unwrap();
        assert_eq!(hits.len(), DEFAULT_K);
        assert_eq!(hits[0].text, "chunk0");
    }

    #[tokio::test]
    async fn test_k_exceeding_cardinality() {
        let dir = write_store(&[vec![1.0, 0.0], vec![0.0, 1.0]], &["chunk0", "chunk1"]);
        let store = VectorStore::load(dir.path()).unwrap();
        let hits = store.similarity_search(&StubBackend, "east", 5).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_empty_store_loads_and_reports_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = FlatIndex::new(2).unwrap();
        let file = std::fs::File::create(dir.path().join(INDEX_FILE)).unwrap();
        let mut writer = std::io::BufWriter::new(file);
        index.write_to(&mut writer).unwrap();
        use std::io::Write;
        writer.flush().unwrap();
        std::fs::write(dir.path().join(CHUNKS_FILE), b"[]").unwrap();

        let store = VectorStore::load(dir.path()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_cardinality_mismatch_fails_load() {
        // 5 vectors but only 4 chunk texts.
        let dir = write_store(
            &[
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.7, 0.7],
                vec![0.5, 0.5],
                vec![0.1, 0.9],
            ],
            &["a", "b", "c", "d"],
        );
        assert!(matches!(
            VectorStore::load(dir.path()),
            Err(AskCorpusError::InconsistentStore(_))
        ));
    }

    #[test]
    fn test_missing_artifacts_fail_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            VectorStore::load(dir.path()),
            Err(AskCorpusError::NotFound(_))
        ));

        // Index present, chunk list missing.
        let with_index = three_chunk_store();
        std::fs::remove_file(with_index.path().join(CHUNKS_FILE)).unwrap();
        assert!(matches!(
            VectorStore::load(with_index.path()),
            Err(AskCorpusError::NotFound(_))
        ));
    }

    #[test]
    fn test_garbled_chunk_list_fails_load() {
        let dir = three_chunk_store();
        std::fs::write(dir.path().join(CHUNKS_FILE), b"not json").unwrap();
        assert!(matches!(
            VectorStore::load(dir.path()),
            Err(AskCorpusError::Config(_))
        ));
    }
}
