//! Offline index builder.
//!
//! One-shot pipeline: chunk the source document, embed every chunk in
//! a single batched provider call, build a flat index, and persist the
//! index/chunk-list pair. Rerunning overwrites both artifacts; there is
//! no incremental merge.

use askcorpus_core::config::ChunkingConfig;
use askcorpus_core::error::{AskCorpusError, Result};
use askcorpus_core::traits::EmbeddingBackend;
use std::io::Write;
use std::path::Path;

use crate::chunker;
use crate::embedder::Embedder;
use crate::index::FlatIndex;
use crate::store::{CHUNKS_FILE, INDEX_FILE};

/// Result of an index build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The source produced zero chunks. Nothing was written; this is a
    /// no-op outcome, not an error.
    Empty,
    /// Both artifacts were written.
    Built { chunks: usize, dim: usize },
}

/// Build the index and chunk list for `source_text` and persist both
/// artifacts under `artifacts_dir`.
///
/// The two files are written to temporary siblings first and renamed
/// into place only after both writes succeed, so a reader never
/// observes a half-written pair.
pub async fn build_index(
    source_text: &str,
    chunking: &ChunkingConfig,
    backend: &dyn EmbeddingBackend,
    artifacts_dir: &Path,
) -> Result<BuildOutcome> {
    chunking.validate()?;

    let chunks = chunker::chunk(source_text, chunking.chunk_size, chunking.overlap)?;
    if chunks.is_empty() {
        tracing::warn!("no chunks produced from source text, nothing to index");
        return Ok(BuildOutcome::Empty);
    }
    tracing::info!(chunks = chunks.len(), "chunked source document");

    let embedder = Embedder::new(backend);
    let vectors = embedder.embed_many(&chunks).await?;
    // embed_many already guarantees one row per chunk and a consistent
    // dimension across rows.
    let dim = vectors[0].len();
    tracing::info!(count = vectors.len(), dim, "embedded chunks");

    let mut index = FlatIndex::new(dim)?;
    index.add_batch(&vectors)?;

    persist(&index, &chunks, artifacts_dir)?;
    tracing::info!(dir = %artifacts_dir.display(), "wrote index artifacts");

    Ok(BuildOutcome::Built { chunks: chunks.len(), dim })
}

/// Write both artifacts atomically-enough: temp files, then rename.
fn persist(index: &FlatIndex, chunks: &[String], dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let index_path = dir.join(INDEX_FILE);
    let chunks_path = dir.join(CHUNKS_FILE);
    let index_tmp = dir.join(format!("{INDEX_FILE}.tmp"));
    let chunks_tmp = dir.join(format!("{CHUNKS_FILE}.tmp"));

    {
        let file = std::fs::File::create(&index_tmp)?;
        let mut writer = std::io::BufWriter::new(file);
        index.write_to(&mut writer)?;
        writer.flush()?;
    }

    let chunks_json = serde_json::to_vec(chunks)
        .map_err(|e| AskCorpusError::Config(format!("failed to serialize chunk list: {e}")))?;
    std::fs::write(&chunks_tmp, chunks_json)?;

    // Chunk list first, index last: the index is the file the store
    // checks first, so an interrupted rename leaves the old pair intact.
    std::fs::rename(&chunks_tmp, &chunks_path)?;
    std::fs::rename(&index_tmp, &index_path)?;

    Ok(())
}
