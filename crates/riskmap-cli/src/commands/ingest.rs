use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use console::style;

use riskmap_core::config::IngestConfig;
use riskmap_ingest::{HttpFeatureSource, IngestMessage, IngestPipeline, StartRequest};

use crate::cli::IngestArgs;
use crate::progress;

pub async fn execute(args: IngestArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = IngestConfig::with_defaults();
    if let Some(path) = config_path {
        config = config
            .load_from_file(path)
            .with_context(|| format!("loading config file {}", path.display()))?;
    }
    let mut config = config.apply_env();
    config.apply_cli(args.chunk_size, args.tolerance, args.buffer);
    config.validate()?;

    let pipeline = IngestPipeline::new(Arc::new(HttpFeatureSource::new()), config.options());
    let mut run = pipeline.spawn(StartRequest::new(args.url.clone()))?;

    let mut writer = match &args.output {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => None,
    };

    let bar = progress::create_progress_bar(100, "Ingesting features...");
    let mut chunk_count = 0usize;
    let mut summary = None;

    while let Some(message) = run.recv().await {
        match &message {
            IngestMessage::Progress { progress, message: text } => {
                bar.set_position(u64::from(*progress));
                bar.set_message(text.clone());
            }
            IngestMessage::ChunkReady { .. } => {
                chunk_count += 1;
                if let Some(writer) = writer.as_mut() {
                    serde_json::to_writer(&mut *writer, &message)?;
                    writeln!(writer)?;
                }
            }
            IngestMessage::Complete { total_features, total_time } => {
                summary = Some((*total_features, total_time.clone()));
            }
            IngestMessage::Error { error } => {
                progress::finish_error(&bar, "Ingestion failed");
                return Err(anyhow!("{error}"));
            }
        }
    }

    if let Some(writer) = writer.as_mut() {
        writer.flush()?;
    }

    let (total_features, total_time) =
        summary.ok_or_else(|| anyhow!("run ended without a terminal message"))?;
    progress::finish_success(&bar, "Ingestion complete");

    println!("  {} {}", style("Features:").bold(), total_features);
    println!("  {} {}", style("Chunks:").bold(), chunk_count);
    println!("  {} {} ms", style("Processing time:").bold(), total_time);
    if let Some(path) = &args.output {
        println!("  {} {}", style("Output:").bold(), path.display());
    }

    Ok(())
}
