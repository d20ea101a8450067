//! Wire protocol between the pipeline and its caller.
//!
//! Messages are tagged with a `type` discriminator and camelCase fields so
//! the serialized form matches what the dashboard's renderer consumes.

use riskmap_core::models::SimplifiedFeature;
use serde::{Deserialize, Serialize};

/// Caller -> pipeline: start one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename = "parseGeojson", rename_all = "camelCase")]
pub struct StartRequest {
    /// Feature-collection resource to fetch
    pub url: String,
    /// Maximum features per chunk; defaults to 10 000 when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
}

impl StartRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), chunk_size: None }
    }

    pub fn with_chunk_size(url: impl Into<String>, chunk_size: usize) -> Self {
        Self { url: url.into(), chunk_size: Some(chunk_size) }
    }
}

/// Pipeline -> caller: the ordered message stream of one run.
///
/// A successful run is zero or more `Progress`/`ChunkReady` pairs followed
/// by exactly one `Complete`. A failed run is exactly one `Error` with no
/// chunks after it. Either terminal message ends the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum IngestMessage {
    Progress {
        /// Percentage of features processed, 0-100
        progress: u8,
        message: String,
    },
    ChunkReady {
        chunk: Vec<SimplifiedFeature>,
        chunk_index: usize,
        total_chunks: usize,
        is_last: bool,
    },
    Complete {
        total_features: usize,
        /// Fetch + simplify + chunk wall time in milliseconds, two decimals
        total_time: String,
    },
    Error {
        error: String,
    },
}

impl IngestMessage {
    /// Whether this message ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestMessage::Complete { .. } | IngestMessage::Error { .. })
    }
}
