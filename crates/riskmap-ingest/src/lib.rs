//! Riskmap Ingest - Background GeoJSON ingestion pipeline
//!
//! One run per start request: fetch a feature collection over HTTP,
//! simplify and chunk it, and stream the chunks to the caller through a
//! bounded channel. The channel capacity is the flow-control mechanism;
//! a slow consumer suspends the producer instead of accumulating chunks.

pub mod fetch;
pub mod pipeline;
pub mod protocol;

pub use fetch::{FeatureSource, HttpFeatureSource};
pub use pipeline::{IngestPipeline, IngestRun, RunState};
pub use protocol::{IngestMessage, StartRequest};
