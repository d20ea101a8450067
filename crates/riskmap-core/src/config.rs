use crate::error::{Result, RiskmapError};
use crate::processing::chunk::DEFAULT_CHUNK_SIZE;
use crate::processing::simplify::DEFAULT_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default capacity of the delivery channel, in chunks.
pub const DEFAULT_DELIVERY_BUFFER: usize = 5;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the ingestion pipeline
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Default maximum features per chunk, used when a start request omits it
    pub chunk_size: ConfigValue<usize>,
    /// Coordinate rounding tolerance in geographic degrees
    pub tolerance: ConfigValue<f64>,
    /// Delivery channel capacity in chunks
    pub delivery_buffer: ConfigValue<usize>,
}

impl IngestConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            chunk_size: ConfigValue::new(DEFAULT_CHUNK_SIZE, ConfigSource::Default),
            tolerance: ConfigValue::new(DEFAULT_TOLERANCE, ConfigSource::Default),
            delivery_buffer: ConfigValue::new(DEFAULT_DELIVERY_BUFFER, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| RiskmapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| RiskmapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        tracing::debug!(path = %path.as_ref().display(), "loaded ingest config file");

        if let Some(ingest) = file_config.ingest {
            if let Some(chunk_size) = ingest.chunk_size {
                self.chunk_size.update(chunk_size, ConfigSource::File);
            }
            if let Some(tolerance) = ingest.tolerance {
                self.tolerance.update(tolerance, ConfigSource::File);
            }
            if let Some(delivery_buffer) = ingest.delivery_buffer {
                self.delivery_buffer.update(delivery_buffer, ConfigSource::File);
            }
        }

        Ok(self)
    }

    /// Apply overrides from `RISKMAP_*` environment variables
    pub fn apply_env(mut self) -> Self {
        self.apply_env_overrides(|key| env::var(key).ok());
        self
    }

    /// Apply environment overrides through a lookup function (testable seam)
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(chunk_size) = lookup("RISKMAP_CHUNK_SIZE").and_then(|v| v.parse().ok()) {
            self.chunk_size.update(chunk_size, ConfigSource::Environment);
        }
        if let Some(tolerance) = lookup("RISKMAP_TOLERANCE").and_then(|v| v.parse().ok()) {
            self.tolerance.update(tolerance, ConfigSource::Environment);
        }
        if let Some(buffer) = lookup("RISKMAP_DELIVERY_BUFFER").and_then(|v| v.parse().ok()) {
            self.delivery_buffer.update(buffer, ConfigSource::Environment);
        }
    }

    /// Apply CLI-provided overrides (highest precedence)
    pub fn apply_cli(
        &mut self,
        chunk_size: Option<usize>,
        tolerance: Option<f64>,
        delivery_buffer: Option<usize>,
    ) {
        if let Some(chunk_size) = chunk_size {
            self.chunk_size.update(chunk_size, ConfigSource::Cli);
        }
        if let Some(tolerance) = tolerance {
            self.tolerance.update(tolerance, ConfigSource::Cli);
        }
        if let Some(buffer) = delivery_buffer {
            self.delivery_buffer.update(buffer, ConfigSource::Cli);
        }
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size.value == 0 {
            return Err(RiskmapError::ConfigInvalid {
                key: "chunk_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.tolerance.value.is_finite() || self.tolerance.value <= 0.0 {
            return Err(RiskmapError::ConfigInvalid {
                key: "tolerance".to_string(),
                reason: format!("must be a positive finite number, got {}", self.tolerance.value),
            });
        }
        if self.delivery_buffer.value == 0 {
            return Err(RiskmapError::ConfigInvalid {
                key: "delivery_buffer".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the layered values into a plain options struct
    pub fn options(&self) -> IngestOptions {
        IngestOptions {
            chunk_size: self.chunk_size.value,
            tolerance: self.tolerance.value,
            delivery_buffer: self.delivery_buffer.value,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Resolved pipeline options
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub chunk_size: usize,
    pub tolerance: f64,
    pub delivery_buffer: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestConfig::with_defaults().options()
    }
}

/// TOML file representation
#[derive(Debug, Deserialize)]
struct FileConfig {
    ingest: Option<FileIngestSection>,
}

#[derive(Debug, Deserialize)]
struct FileIngestSection {
    chunk_size: Option<usize>,
    tolerance: Option<f64>,
    delivery_buffer: Option<usize>,
}
