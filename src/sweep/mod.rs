//! Concurrency sweep over the inferbench executable.
//!
//! This module provides:
//! - Process execution behind an injectable capability
//! - Scoped result documents (filesystem or in-memory)
//! - A runner enforcing the executable's flag contract
//! - A controller that tolerates per-level failures
//! - Report generation

pub mod config;
pub mod controller;
pub mod executor;
pub mod report;
pub mod result_store;
pub mod runner;

pub use config::{BenchmarkConfig, OptimizationLevel, SweepSettings};
pub use controller::{SweepController, SweepPoint, SweepResult};
pub use executor::{ProcessExecutor, ProcessOutput, TokioExecutor};
pub use report::SweepReport;
pub use result_store::{FsResultStore, MemoryResultStore, ResultStore};
pub use runner::{ProcessRunner, RunMetrics};
