use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Riskmap - Flow-controlled GeoJSON ingestion
#[derive(Parser, Debug)]
#[command(name = "riskmap")]
#[command(about = "Fetch, simplify, and chunk GeoJSON risk layers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one ingestion: fetch a feature collection and stream chunks
    Ingest(IngestArgs),
}

#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// URL of the GeoJSON feature collection
    pub url: String,

    /// Maximum number of features per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Coordinate rounding tolerance in geographic degrees
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Delivery channel capacity, in chunks buffered ahead of the consumer
    #[arg(long)]
    pub buffer: Option<usize>,

    /// Write delivered chunk messages to this file as NDJSON
    #[arg(long)]
    pub output: Option<PathBuf>,
}
