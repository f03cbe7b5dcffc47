//! Embedding with L2 normalization.
//!
//! Wraps a remote [`EmbeddingBackend`] and turns its raw vectors into
//! unit-length f32 vectors. Euclidean distance over unit vectors is a
//! monotonic function of cosine similarity, which is what the flat
//! index relies on.

use askcorpus_core::error::{AskCorpusError, Result};
use askcorpus_core::traits::EmbeddingBackend;

/// Normalizing front-end over an embedding provider.
pub struct Embedder<'a> {
    backend: &'a dyn EmbeddingBackend,
}

impl<'a> Embedder<'a> {
    pub fn new(backend: &'a dyn EmbeddingBackend) -> Self {
        Self { backend }
    }

    /// Embed a batch of texts in one provider call and L2-normalize
    /// each returned vector independently.
    ///
    /// Empty input returns an empty Vec without touching the provider.
    /// The provider must return exactly one vector per input, all of
    /// the same nonzero dimension; anything else is a
    /// `RetrievalBackend` error.
    pub async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = self.backend.embed(texts).await?;

        if vectors.len() != texts.len() {
            return Err(AskCorpusError::RetrievalBackend(format!(
                "provider '{}' returned {} vectors for {} inputs",
                self.backend.name(),
                vectors.len(),
                texts.len()
            )));
        }

        let dim = vectors[0].len();
        if dim == 0 {
            return Err(AskCorpusError::RetrievalBackend(format!(
                "provider '{}' returned zero-dimension vectors",
                self.backend.name()
            )));
        }
        for (i, v) in vectors.iter().enumerate() {
            if v.len() != dim {
                return Err(AskCorpusError::RetrievalBackend(format!(
                    "inconsistent embedding dimension: row {i} has {} values, expected {dim}",
                    v.len()
                )));
            }
        }

        for v in &mut vectors {
            l2_normalize(v)?;
        }

        Ok(vectors)
    }

    /// Embed a single text. Convenience wrapper over `embed_many`.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_many(&texts).await?;
        vectors.pop().ok_or_else(|| {
            AskCorpusError::RetrievalBackend("provider returned no vector for single input".into())
        })
    }
}

/// Rescale `v` to unit L2 length in place.
///
/// A zero or non-finite norm cannot be normalized; that is a provider
/// data error, never a silent NaN vector.
pub fn l2_normalize(v: &mut [f32]) -> Result<()> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Err(AskCorpusError::RetrievalBackend(format!(
            "cannot normalize embedding with norm {norm}"
        )));
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic stub: one fixed raw vector per known text.
    struct StubBackend {
        rows: Vec<Vec<f32>>,
    }

    #[async_trait]
    impl EmbeddingBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            assert_eq!(texts.len(), self.rows.len());
            Ok(self.rows.clone())
        }
    }

    #[tokio::test]
    async fn test_embed_many_normalizes_every_vector() {
        let backend = StubBackend {
            rows: vec![vec![3.0, 4.0], vec![0.5, 0.5], vec![-2.0, 0.0]],
        };
        let embedder = Embedder::new(&backend);
        let texts: Vec<String> = vec!["a".into(), "b".into(), "c".into()];

        let vectors = embedder.embed_many(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
        for v in &vectors {
            let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
        }
        assert!((vectors[0][0] - 0.6).abs() < 1e-6);
        assert!((vectors[0][1] - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_empty_input_skips_provider() {
        // rows is empty, so any provider call would panic the stub's
        // length assertion on a non-empty batch.
        let backend = StubBackend { rows: vec![] };
        let embedder = Embedder::new(&backend);
        let out = embedder.embed_many(&[]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_zero_norm_vector_is_an_error() {
        let backend = StubBackend {
            rows: vec![vec![0.0, 0.0]],
        };
        let embedder = Embedder::new(&backend);
        let err = embedder.embed_one("q").await.unwrap_err();
        assert!(matches!(err, AskCorpusError::RetrievalBackend(_)));
    }

    #[tokio::test]
    async fn test_inconsistent_dimension_is_an_error() {
        let backend = StubBackend {
            rows: vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]],
        };
        let embedder = Embedder::new(&backend);
        let texts: Vec<String> = vec!["a".into(), "b".into()];
        let err = embedder.embed_many(&texts).await.unwrap_err();
        assert!(matches!(err, AskCorpusError::RetrievalBackend(_)));
    }

    /// Row-count mismatch from the provider must not pass through.
    struct ShortBackend;

    #[async_trait]
    impl EmbeddingBackend for ShortBackend {
        fn name(&self) -> &str {
            "short"
        }

        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    #[tokio::test]
    async fn test_row_count_mismatch_is_an_error() {
        let embedder = Embedder::new(&ShortBackend);
        let texts: Vec<String> = vec!["a".into(), "b".into()];
        let err = embedder.embed_many(&texts).await.unwrap_err();
        assert!(matches!(err, AskCorpusError::RetrievalBackend(_)));
    }
}
