// src/config/mod.rs

pub mod harness_config;

// Re-export main types for convenience
pub use harness_config::{BenchmarkConfig, HarnessConfig, PlotConfig, VisualizationConfig};
