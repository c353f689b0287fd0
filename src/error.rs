// Error handling module
// Defines the error taxonomy for configuration, per-level runs and chart output

use std::path::PathBuf;
use thiserror::Error;

/// Invalid invocation arguments, detected before any sweep work starts
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Benchmark executable does not exist
    #[error("Executable {} not found", .0.display())]
    MissingExecutable(PathBuf),

    /// Model artifact does not exist
    #[error("Model {} not found", .0.display())]
    MissingModel(PathBuf),

    /// No concurrency levels to sweep
    #[error("At least one concurrency level is required")]
    EmptySweep,

    /// A concurrency level of zero threads
    #[error("Concurrency levels must be positive (got 0)")]
    ZeroConcurrency,

    /// Zero per-thread requests
    #[error("Requests per thread must be positive")]
    ZeroRequests,

    /// Total requests for a level do not fit in 64 bits
    #[error("{requests} requests per thread at {threads} threads overflows the total request count")]
    RequestOverflow { requests: u64, threads: u32 },
}

/// Failure of a single benchmark invocation.
///
/// Recoverable at the sweep level: the controller records a zero-filled point
/// and moves on to the next concurrency level.
#[derive(Error, Debug)]
pub enum RunFailure {
    /// The executable could not be launched at all
    #[error("Failed to launch benchmark: {0}")]
    Spawn(#[from] std::io::Error),

    /// The executable exited with a nonzero status
    #[error("Benchmark exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// Zero exit status but no result document was written
    #[error("Benchmark result {} not generated", .path.display())]
    MissingResult { path: PathBuf },

    /// Result document exists but could not be read
    #[error("Cannot access benchmark result {}: {source}", .path.display())]
    ResultAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Result document present but not valid JSON or missing fields
    #[error("Malformed benchmark result: {detail}")]
    MalformedResult { detail: String },
}

/// Chart rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Output directory or image file could not be written
    #[error("Chart I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Drawing backend failure
    #[error("Chart drawing failed: {0}")]
    Drawing(String),
}
