// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias used across the harness
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Every way a benchmark or visualization run can fail.
///
/// All of these are terminal: the run that produced them is abandoned and
/// nothing is retried.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The solver exited non-zero, could not be spawned, timed out, or printed
    /// something other than a single number
    #[error("solver command `{command}` failed: {reason}")]
    ProcessExecution { command: String, reason: String },

    /// A parallel timing of zero seconds cannot be divided into
    #[error("parallel time for problem size {problem_size} with {thread_count} threads is zero")]
    DivisionByZero { problem_size: u32, thread_count: u32 },

    /// Parallel table references a problem size the sequential table lacks
    #[error("problem size {problem_size} has no sequential timing")]
    KeyMismatch { problem_size: u32 },

    #[error("malformed snapshot {}: {reason}", .path.display())]
    MalformedSnapshot { path: PathBuf, reason: String },

    #[error("no frames to assemble in {}", .directory.display())]
    EmptySequence { directory: PathBuf },

    /// A frame name matched the naming convention but carries no iteration index
    #[error("cannot read an iteration index from frame name `{file_name}`")]
    FilenameFormat { file_name: String },

    #[error("invalid command template: {0}")]
    InvalidTemplate(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("plotting failed: {0}")]
    Plot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl HarnessError {
    pub(crate) fn process(command: impl Into<String>, reason: impl Into<String>) -> Self {
        HarnessError::ProcessExecution {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn snapshot(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        HarnessError::MalformedSnapshot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Plotters errors are generic over the backend, so they are flattened to text
    pub(crate) fn plot<E: std::fmt::Display>(err: E) -> Self {
        HarnessError::Plot(err.to_string())
    }
}
