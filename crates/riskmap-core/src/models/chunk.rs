//! Chunk model: a bounded, ordered group of simplified features.

use crate::models::SimplifiedFeature;
use serde::{Deserialize, Serialize};

/// One partition of a simplified feature sequence.
///
/// Chunks are produced once, delivered once, in index order. `progress` is
/// the percentage of the input processed when this chunk was cut, so a
/// delivery loop can report it alongside the chunk itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureChunk {
    pub features: Vec<SimplifiedFeature>,
    /// Zero-based position in the chunk sequence
    pub index: usize,
    /// Total number of chunks in the run
    pub total: usize,
    /// Whether this is the final chunk
    pub is_last: bool,
    /// Percentage of features processed at this chunk boundary, 0-100
    pub progress: u8,
}

impl FeatureChunk {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
