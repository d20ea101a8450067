//! Riskmap Core - Domain models, processing stages, and configuration
//!
//! This crate contains the pure parts of the ingestion pipeline: the
//! simplified feature model, coordinate rounding, property projection,
//! chunk partitioning, the error taxonomy, and layered configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod processing;

pub use error::{Result, RiskmapError};
