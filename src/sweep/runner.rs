//! Single invocation of the benchmark executable.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;

use super::config::{BenchmarkConfig, OptimizationLevel};
use super::executor::ProcessExecutor;
use super::result_store::ResultStore;
use crate::error::RunFailure;

/// Measurements recovered from one successful invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunMetrics {
    pub qps: f64,
    pub avg_latency_ms: f64,
    pub avg_cpu_usage: Option<f64>,
    pub peak_memory_mb: Option<f64>,
}

/// Shape of the document written to the `--json` path
#[derive(Debug, Deserialize)]
struct ResultDocument {
    result: ResultBody,
}

#[derive(Debug, Deserialize)]
struct ResultBody {
    qps: f64,
    avg_latency_ms: f64,
    #[serde(default)]
    avg_cpu_usage: Option<f64>,
    #[serde(default)]
    peak_memory_mb: Option<f64>,
}

/// Launches the executable with the fixed flag contract and recovers its result
pub struct ProcessRunner<E, S> {
    executor: E,
    store: S,
    optimization: OptimizationLevel,
}

impl<E: ProcessExecutor, S: ResultStore> ProcessRunner<E, S> {
    pub fn new(executor: E, store: S, optimization: OptimizationLevel) -> Self {
        Self {
            executor,
            store,
            optimization,
        }
    }

    /// Run one invocation to completion.
    ///
    /// Every failure mode comes back as a [`RunFailure`]; nothing escapes as a
    /// panic. The result slot is released only when something was read from it.
    pub async fn run(
        &self,
        config: &BenchmarkConfig,
        thread_count: u32,
        total_requests: u64,
        warmup_count: u32,
    ) -> Result<RunMetrics, RunFailure> {
        let result_path = self.store.allocate(thread_count);
        let argv = build_argv(
            config,
            thread_count,
            total_requests,
            warmup_count,
            &result_path,
            self.optimization,
        );
        tracing::debug!("Running: {}", display_argv(&argv));

        let output = self.executor.execute(&argv).await?;
        if !output.success() {
            return Err(RunFailure::NonZeroExit {
                code: output.exit_code,
                stderr: output.stderr_text(),
            });
        }

        let bytes = self
            .store
            .take(&result_path)
            .await
            .map_err(|source| RunFailure::ResultAccess {
                path: result_path.clone(),
                source,
            })?
            .ok_or_else(|| RunFailure::MissingResult {
                path: result_path.clone(),
            })?;

        parse_result(&bytes)
    }
}

/// Build the argument vector, program first
pub fn build_argv(
    config: &BenchmarkConfig,
    thread_count: u32,
    total_requests: u64,
    warmup_count: u32,
    result_path: &Path,
    optimization: OptimizationLevel,
) -> Vec<OsString> {
    vec![
        config.executable_path.clone().into_os_string(),
        "--model".into(),
        config.model_path.clone().into_os_string(),
        "--threads".into(),
        thread_count.to_string().into(),
        "--requests".into(),
        total_requests.to_string().into(),
        "--warmup".into(),
        warmup_count.to_string().into(),
        "--json".into(),
        result_path.as_os_str().to_owned(),
        "--optimization".into(),
        optimization.to_string().into(),
    ]
}

fn display_argv(argv: &[OsString]) -> String {
    argv.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_result(bytes: &[u8]) -> Result<RunMetrics, RunFailure> {
    let doc: ResultDocument =
        serde_json::from_slice(bytes).map_err(|e| RunFailure::MalformedResult {
            detail: e.to_string(),
        })?;

    Ok(RunMetrics {
        qps: doc.result.qps,
        avg_latency_ms: doc.result.avg_latency_ms,
        avg_cpu_usage: doc.result.avg_cpu_usage,
        peak_memory_mb: doc.result.peak_memory_mb,
    })
}
