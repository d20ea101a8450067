//! Chunk partitioning with per-chunk progress.

use crate::error::{Result, RiskmapError};
use crate::models::{FeatureChunk, SimplifiedFeature};

/// Default maximum features per chunk when a start request omits it.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Partition simplified features into consecutive chunks of at most
/// `chunk_size` features, preserving input order.
///
/// The last chunk may be short. Each chunk records the progress percentage
/// at its boundary, `min(end * 100 / total, 100)`, so progress is
/// non-decreasing across the sequence and reaches 100 on the final chunk.
/// Zero features yield zero chunks.
pub fn partition(
    features: Vec<SimplifiedFeature>,
    chunk_size: usize,
) -> Result<Vec<FeatureChunk>> {
    if chunk_size == 0 {
        return Err(RiskmapError::ConfigInvalid {
            key: "chunk_size".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let total_features = features.len();
    if total_features == 0 {
        return Ok(Vec::new());
    }

    let total_chunks = total_features.div_ceil(chunk_size);
    let mut chunks = Vec::with_capacity(total_chunks);
    let mut features = features.into_iter();

    for index in 0..total_chunks {
        let batch: Vec<SimplifiedFeature> = features.by_ref().take(chunk_size).collect();
        let end = index * chunk_size + batch.len();
        let progress = ((end * 100 / total_features).min(100)) as u8;

        chunks.push(FeatureChunk {
            features: batch,
            index,
            total: total_chunks,
            is_last: index + 1 == total_chunks,
            progress,
        });
    }

    Ok(chunks)
}
