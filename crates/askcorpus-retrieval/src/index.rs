//! Exact flat L2 index.
//!
//! Brute-force squared-Euclidean nearest-neighbor search over a dense
//! row-major f32 matrix. No approximation, no quantization: corpora
//! are small and exactness keeps result semantics simple.
//!
//! On-disk format (all little-endian):
//! - Magic: "ACIX" (4 bytes)
//! - Version: u32 (must be 1)
//! - Vector count: u64
//! - Dimension: u32
//! - Vector data: count * dim f32 values, row-major

use askcorpus_core::error::{AskCorpusError, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Index file magic number.
const INDEX_MAGIC: u32 = 0x58494341; // "ACIX" in little-endian

/// Supported index format version.
const INDEX_VERSION: u32 = 1;

/// Dense row-major collection of fixed-dimension f32 vectors with
/// exact squared-L2 top-k search.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for `dim`-dimensional vectors.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(AskCorpusError::Config("index dimension must be > 0".into()));
        }
        Ok(Self { dim, data: Vec::new() })
    }

    /// Append a batch of vectors. Every row must match the index
    /// dimension.
    pub fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        for (i, v) in vectors.iter().enumerate() {
            if v.len() != self.dim {
                return Err(AskCorpusError::RetrievalBackend(format!(
                    "vector {i} has dimension {}, index expects {}",
                    v.len(),
                    self.dim
                )));
            }
        }
        for v in vectors {
            self.data.extend_from_slice(v);
        }
        Ok(())
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Exact k-nearest-neighbor search by squared Euclidean distance.
    ///
    /// Returns at most `min(k, len)` `(position, distance)` pairs,
    /// ascending by distance (ties broken by position). Positions past
    /// the index cardinality never appear; there are no placeholder
    /// entries.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(AskCorpusError::RetrievalBackend(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dim
            )));
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(i, row)| (i, squared_l2(row, query)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k.min(scored.len()));
        Ok(scored)
    }

    /// Serialize the index to a writer.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&INDEX_MAGIC.to_le_bytes())?;
        w.write_all(&INDEX_VERSION.to_le_bytes())?;
        w.write_all(&(self.len() as u64).to_le_bytes())?;
        w.write_all(&(self.dim as u32).to_le_bytes())?;
        for x in &self.data {
            w.write_all(&x.to_le_bytes())?;
        }
        Ok(())
    }

    /// Deserialize an index from a reader, validating magic, version,
    /// and that exactly `count * dim` values are present.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let magic = read_u32(r)?;
        if magic != INDEX_MAGIC {
            return Err(AskCorpusError::Config(format!(
                "bad index magic: {magic:#010x}"
            )));
        }
        let version = read_u32(r)?;
        if version != INDEX_VERSION {
            return Err(AskCorpusError::Config(format!(
                "unsupported index version: {version}"
            )));
        }
        let count = read_u64(r)? as usize;
        let dim = read_u32(r)? as usize;
        if dim == 0 {
            return Err(AskCorpusError::Config("index dimension must be > 0".into()));
        }

        let total = count.checked_mul(dim).ok_or_else(|| {
            AskCorpusError::Config(format!(
                "index header declares an impossible shape: {count} x {dim}"
            ))
        })?;

        // Cap the pre-allocation so a garbled header cannot reserve
        // gigabytes before the read fails on truncation.
        let mut data = Vec::with_capacity(total.min(1 << 20));
        for _ in 0..total {
            data.push(read_f32(r)?);
        }

        // Trailing bytes mean the header lied about the shape.
        let mut extra = [0u8; 1];
        if r.read(&mut extra)? != 0 {
            return Err(AskCorpusError::Config(
                "index file has trailing data beyond declared shape".into(),
            ));
        }

        Ok(Self { dim, data })
    }

    /// Read an index from a file path.
    pub fn read_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// Squared Euclidean distance between two equal-length slices.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

// ===== Low-level reading helpers =====

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)
        .map_err(|e| AskCorpusError::Config(format!("truncated index file: {e}")))?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)
        .map_err(|e| AskCorpusError::Config(format!("truncated index file: {e}")))?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f32<R: Read>(r: &mut R) -> Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)
        .map_err(|e| AskCorpusError::Config(format!("truncated index file: {e}")))?;
    Ok(f32::from_le_bytes(buf))
}
