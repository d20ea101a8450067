//! Run orchestration: one spawned task per start request.
//!
//! The task walks the four stages in order (fetch, simplify, chunk,
//! deliver) and talks to the caller exclusively through a bounded message
//! channel. `send().await` on a full channel is the backpressure: the
//! producer suspends until the consumer drains a message, so throughput
//! adapts to the consumer's real rate instead of a fixed pacing timer.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use riskmap_core::config::IngestOptions;
use riskmap_core::error::{Result, RiskmapError};
use riskmap_core::models::FeatureChunk;
use riskmap_core::processing::{partition, simplify_feature};

use crate::fetch::FeatureSource;
use crate::protocol::{IngestMessage, StartRequest};

/// Lifecycle of one ingestion run.
///
/// `Completed` and `Failed` are terminal; a new start request always
/// begins a fresh run in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Processing,
    Delivering,
    Completed,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(!self.is_terminal(), "no transitions out of a terminal state");
        tracing::trace!(from = ?*self, to = ?next, "run state transition");
        *self = next;
    }
}

/// Factory for ingestion runs over a shared feature source.
pub struct IngestPipeline {
    source: Arc<dyn FeatureSource>,
    options: IngestOptions,
}

impl IngestPipeline {
    pub fn new(source: Arc<dyn FeatureSource>, options: IngestOptions) -> Self {
        Self { source, options }
    }

    /// Accept a start request and spawn its run.
    ///
    /// Returns the run handle the caller drains messages from. The request
    /// is rejected up front when its chunk size is zero; everything that
    /// can fail later surfaces as an `Error` message instead.
    pub fn spawn(&self, request: StartRequest) -> Result<IngestRun> {
        let chunk_size = request.chunk_size.unwrap_or(self.options.chunk_size);
        if chunk_size == 0 {
            return Err(RiskmapError::ConfigInvalid {
                key: "chunk_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let run_id = Uuid::new_v4();
        // A zero-capacity channel is not representable; one chunk of
        // lookahead is the floor.
        let (tx, rx) = mpsc::channel(self.options.delivery_buffer.max(1));
        let cancel = CancellationToken::new();

        let source = Arc::clone(&self.source);
        let tolerance = self.options.tolerance;
        let token = cancel.clone();
        let span = tracing::info_span!("ingest_run", %run_id, url = %request.url);

        let task = tokio::spawn(
            async move {
                run(source.as_ref(), &request.url, chunk_size, tolerance, tx, token).await;
            }
            .instrument(span),
        );

        Ok(IngestRun { run_id, receiver: rx, cancel, task })
    }
}

/// Handle to one in-flight ingestion run.
///
/// Dropping the handle drops the receiver, which the pipeline treats the
/// same as cancellation: the next send fails and the task exits.
pub struct IngestRun {
    pub run_id: Uuid,
    receiver: mpsc::Receiver<IngestMessage>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl IngestRun {
    /// Receive the next message, or `None` once the run has shut down.
    pub async fn recv(&mut self) -> Option<IngestMessage> {
        self.receiver.recv().await
    }

    /// Request the run to stop. Checked between chunk emissions: in-flight
    /// buffered messages may still arrive, but no terminal message follows.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the background task to finish.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

async fn run(
    source: &dyn FeatureSource,
    url: &str,
    chunk_size: usize,
    tolerance: f64,
    tx: mpsc::Sender<IngestMessage>,
    cancel: CancellationToken,
) {
    let mut state = RunState::Idle;

    match process(source, url, chunk_size, tolerance, &mut state).await {
        Ok(outcome) => deliver(outcome, &tx, &cancel, &mut state).await,
        Err(err) => {
            state.advance(RunState::Failed);
            tracing::warn!(error = %err, "ingestion run failed");
            let _ = tx.send(IngestMessage::Error { error: err.to_string() }).await;
        }
    }
}

struct ProcessOutcome {
    chunks: Vec<FeatureChunk>,
    total_features: usize,
    total_time: String,
}

/// Fetch, simplify, and chunk. The elapsed-time clock covers exactly these
/// stages; delivery suspension must never inflate the reported figure.
async fn process(
    source: &dyn FeatureSource,
    url: &str,
    chunk_size: usize,
    tolerance: f64,
    state: &mut RunState,
) -> Result<ProcessOutcome> {
    let started = Instant::now();

    state.advance(RunState::Fetching);
    let collection = source.fetch(url).await?;

    state.advance(RunState::Processing);
    let total_features = collection.features.len();
    let simplified = collection
        .features
        .iter()
        .map(|feature| simplify_feature(feature, tolerance))
        .collect();
    let chunks = partition(simplified, chunk_size)?;

    let total_time = format!("{:.2}", started.elapsed().as_secs_f64() * 1000.0);
    tracing::info!(total_features, total_chunks = chunks.len(), %total_time, "processing done");

    Ok(ProcessOutcome { chunks, total_features, total_time })
}

async fn deliver(
    outcome: ProcessOutcome,
    tx: &mpsc::Sender<IngestMessage>,
    cancel: &CancellationToken,
    state: &mut RunState,
) {
    state.advance(RunState::Delivering);

    let total_features = outcome.total_features;
    let mut processed = 0usize;

    for chunk in outcome.chunks {
        if cancel.is_cancelled() {
            tracing::debug!(chunk_index = chunk.index, "run cancelled, stopping delivery");
            return;
        }

        processed += chunk.len();
        let progress = IngestMessage::Progress {
            progress: chunk.progress,
            message: format!("Processed {processed} of {total_features} features"),
        };
        if tx.send(progress).await.is_err() {
            tracing::debug!("receiver dropped, stopping delivery");
            return;
        }

        let message = IngestMessage::ChunkReady {
            chunk_index: chunk.index,
            total_chunks: chunk.total,
            is_last: chunk.is_last,
            chunk: chunk.features,
        };
        if tx.send(message).await.is_err() {
            tracing::debug!("receiver dropped, stopping delivery");
            return;
        }
    }

    state.advance(RunState::Completed);
    let _ = tx
        .send(IngestMessage::Complete {
            total_features,
            total_time: outcome.total_time,
        })
        .await;
}
