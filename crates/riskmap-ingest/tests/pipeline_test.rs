//! Integration tests for the ingestion pipeline over in-test feature
//! sources: message ordering, feature conservation, cancellation, and the
//! terminal-message contract.

use std::sync::Arc;

use async_trait::async_trait;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use riskmap_core::config::IngestOptions;
use riskmap_core::error::{Result, RiskmapError};
use riskmap_ingest::{FeatureSource, IngestMessage, IngestPipeline, IngestRun, StartRequest};

struct StaticSource {
    collection: FeatureCollection,
}

#[async_trait]
impl FeatureSource for StaticSource {
    async fn fetch(&self, _url: &str) -> Result<FeatureCollection> {
        Ok(self.collection.clone())
    }
}

struct FailingSource;

#[async_trait]
impl FeatureSource for FailingSource {
    async fn fetch(&self, url: &str) -> Result<FeatureCollection> {
        Err(RiskmapError::Transport {
            url: url.to_string(),
            reason: "HTTP status 404".to_string(),
        })
    }
}

fn properties(index: usize) -> JsonObject {
    json!({
        "risk_class": "high",
        "color": "#d7191c",
        "district": format!("district-{index}"),
        "population": index,
        "surveyed_by": "dropped by projection",
    })
    .as_object()
    .unwrap()
    .clone()
}

fn collection(count: usize) -> FeatureCollection {
    let features = (0..count)
        .map(|i| Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                76.0 + i as f64 * 0.00123,
                43.0,
            ]))),
            id: None,
            properties: Some(properties(i)),
            foreign_members: None,
        })
        .collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

fn pipeline(count: usize, options: IngestOptions) -> IngestPipeline {
    IngestPipeline::new(Arc::new(StaticSource { collection: collection(count) }), options)
}

async fn collect(mut run: IngestRun) -> Vec<IngestMessage> {
    let mut messages = Vec::new();
    while let Some(message) = run.recv().await {
        messages.push(message);
    }
    messages
}

#[tokio::test]
async fn test_23_features_in_chunks_of_10() {
    let pipeline = pipeline(23, IngestOptions::default());
    let run = pipeline
        .spawn(StartRequest::with_chunk_size("mem://zones", 10))
        .unwrap();
    let messages = collect(run).await;

    let mut chunk_sizes = Vec::new();
    let mut chunk_indices = Vec::new();
    let mut last_flags = Vec::new();
    let mut progress_values: Vec<u8> = Vec::new();
    let mut completion = None;

    for message in &messages {
        match message {
            IngestMessage::Progress { progress, .. } => progress_values.push(*progress),
            IngestMessage::ChunkReady { chunk, chunk_index, total_chunks, is_last } => {
                assert_eq!(*total_chunks, 3);
                chunk_sizes.push(chunk.len());
                chunk_indices.push(*chunk_index);
                last_flags.push(*is_last);
            }
            IngestMessage::Complete { total_features, .. } => {
                completion = Some(*total_features);
            }
            IngestMessage::Error { error } => panic!("unexpected error: {error}"),
        }
    }

    assert_eq!(chunk_sizes, vec![10, 10, 3]);
    assert_eq!(chunk_indices, vec![0, 1, 2]);
    assert_eq!(last_flags, vec![false, false, true]);
    assert_eq!(completion, Some(23));

    // Progress is monotonically non-decreasing and bounded
    for pair in progress_values.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert!(progress_values.iter().all(|p| *p <= 100));

    // The terminal message is last
    assert!(messages.last().unwrap().is_terminal());
    assert_eq!(messages.iter().filter(|m| m.is_terminal()).count(), 1);
}

#[tokio::test]
async fn test_empty_collection_completes_without_chunks() {
    let pipeline = pipeline(0, IngestOptions::default());
    let run = pipeline.spawn(StartRequest::new("mem://empty")).unwrap();
    let messages = collect(run).await;

    assert_eq!(messages.len(), 1);
    match &messages[0] {
        IngestMessage::Complete { total_features, .. } => assert_eq!(*total_features, 0),
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chunk_size_larger_than_input_yields_one_chunk() {
    let pipeline = pipeline(50, IngestOptions::default());
    let run = pipeline.spawn(StartRequest::new("mem://zones")).unwrap();
    let messages = collect(run).await;

    let chunks: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            IngestMessage::ChunkReady { chunk, chunk_index, total_chunks, is_last } => {
                Some((chunk.len(), *chunk_index, *total_chunks, *is_last))
            }
            _ => None,
        })
        .collect();

    assert_eq!(chunks, vec![(50, 0, 1, true)]);
}

#[tokio::test]
async fn test_delivered_features_are_conserved_in_order() {
    let pipeline = pipeline(23, IngestOptions::default());
    let run = pipeline
        .spawn(StartRequest::with_chunk_size("mem://zones", 7))
        .unwrap();
    let messages = collect(run).await;

    let populations: Vec<u64> = messages
        .iter()
        .filter_map(|m| match m {
            IngestMessage::ChunkReady { chunk, .. } => Some(chunk),
            _ => None,
        })
        .flat_map(|chunk| chunk.iter().map(|f| f.properties.population.unwrap()))
        .collect();

    let expected: Vec<u64> = (0..23).collect();
    assert_eq!(populations, expected);

    let total = match messages.last().unwrap() {
        IngestMessage::Complete { total_features, .. } => *total_features,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(populations.len(), total);
}

#[tokio::test]
async fn test_delivered_features_are_simplified() {
    let pipeline = pipeline(1, IngestOptions::default());
    let run = pipeline.spawn(StartRequest::new("mem://zones")).unwrap();
    let messages = collect(run).await;

    let feature = messages
        .iter()
        .find_map(|m| match m {
            IngestMessage::ChunkReady { chunk, .. } => chunk.first(),
            _ => None,
        })
        .expect("one delivered feature");

    // Properties are projected onto the closed schema
    assert_eq!(feature.properties.risk_class.as_deref(), Some("high"));
    let serialized = serde_json::to_value(&feature.properties).unwrap();
    assert!(serialized.get("surveyed_by").is_none());

    // Coordinates are snapped to the tolerance grid
    let Some(Geometry { value: Value::Point(pos), .. }) = &feature.geometry else {
        panic!("expected a point geometry");
    };
    assert!((pos[0] - 76.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_failed_fetch_emits_exactly_one_error() {
    let pipeline = IngestPipeline::new(Arc::new(FailingSource), IngestOptions::default());
    let run = pipeline.spawn(StartRequest::new("mem://missing")).unwrap();
    let messages = collect(run).await;

    assert_eq!(messages.len(), 1);
    match &messages[0] {
        IngestMessage::Error { error } => assert!(error.contains("404"), "got: {error}"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_zero_chunk_size_is_rejected_up_front() {
    let pipeline = pipeline(5, IngestOptions::default());
    let result = pipeline.spawn(StartRequest::with_chunk_size("mem://zones", 0));
    assert!(matches!(result, Err(RiskmapError::ConfigInvalid { .. })));
}

#[tokio::test]
async fn test_cancellation_stops_delivery() {
    let options = IngestOptions { delivery_buffer: 2, ..IngestOptions::default() };
    let pipeline = pipeline(100, options);
    let mut run = pipeline
        .spawn(StartRequest::with_chunk_size("mem://zones", 1))
        .unwrap();

    // Drain a few messages, then ask the run to stop.
    let mut received = Vec::new();
    for _ in 0..4 {
        received.push(run.recv().await.expect("message before cancellation"));
    }
    run.cancel();
    assert!(run.is_cancelled());

    while let Some(message) = run.recv().await {
        received.push(message);
    }

    // Buffered chunks may still arrive, but the run never completes and
    // delivers far fewer than all 100 chunks.
    assert!(received.iter().all(|m| !m.is_terminal()));
    let chunk_count = received
        .iter()
        .filter(|m| matches!(m, IngestMessage::ChunkReady { .. }))
        .count();
    assert!(chunk_count < 100);
}

#[tokio::test]
async fn test_request_chunk_size_overrides_configured_default() {
    let options = IngestOptions { chunk_size: 10_000, ..IngestOptions::default() };
    let pipeline = pipeline(12, options);
    let run = pipeline
        .spawn(StartRequest::with_chunk_size("mem://zones", 5))
        .unwrap();
    let messages = collect(run).await;

    let total_chunks = messages
        .iter()
        .find_map(|m| match m {
            IngestMessage::ChunkReady { total_chunks, .. } => Some(*total_chunks),
            _ => None,
        })
        .unwrap();
    assert_eq!(total_chunks, 3);
}

#[tokio::test]
async fn test_completion_reports_processing_time() {
    let pipeline = pipeline(3, IngestOptions::default());
    let run = pipeline.spawn(StartRequest::new("mem://zones")).unwrap();
    let messages = collect(run).await;

    let total_time = match messages.last().unwrap() {
        IngestMessage::Complete { total_time, .. } => total_time.clone(),
        other => panic!("expected completion, got {other:?}"),
    };

    // Milliseconds formatted with two decimals
    let millis: f64 = total_time.parse().unwrap();
    assert!(millis >= 0.0);
    assert_eq!(total_time.split('.').nth(1).map(str::len), Some(2));
}
