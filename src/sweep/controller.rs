//! Sweep orchestration across concurrency levels.

use serde::{Deserialize, Serialize};

use super::config::{BenchmarkConfig, SweepSettings};
use super::executor::ProcessExecutor;
use super::result_store::ResultStore;
use super::runner::ProcessRunner;

/// Outcome at one concurrency level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub thread_count: u32,
    pub total_requests: u64,
    pub qps: f64,
    pub avg_latency_ms: f64,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_cpu_usage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_memory_mb: Option<f64>,
    /// Failure detail for unsuccessful points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SweepPoint {
    /// Zero-filled point standing in for a failed level
    pub fn failed(thread_count: u32, total_requests: u64, error: impl Into<String>) -> Self {
        Self {
            thread_count,
            total_requests,
            qps: 0.0,
            avg_latency_ms: 0.0,
            succeeded: false,
            avg_cpu_usage: None,
            peak_memory_mb: None,
            error: Some(error.into()),
        }
    }
}

/// Ordered series, one point per configured level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn thread_counts(&self) -> Vec<u32> {
        self.points.iter().map(|p| p.thread_count).collect()
    }

    pub fn qps_series(&self) -> Vec<(u32, f64)> {
        self.points.iter().map(|p| (p.thread_count, p.qps)).collect()
    }

    pub fn latency_series(&self) -> Vec<(u32, f64)> {
        self.points
            .iter()
            .map(|p| (p.thread_count, p.avg_latency_ms))
            .collect()
    }

    pub fn failure_count(&self) -> usize {
        self.points.iter().filter(|p| !p.succeeded).count()
    }
}

/// Drives the runner once per level, in order, never aborting early
pub struct SweepController<E, S> {
    runner: ProcessRunner<E, S>,
    concurrency_levels: Vec<u32>,
    warmup_count: u32,
}

impl<E: ProcessExecutor, S: ResultStore> SweepController<E, S> {
    pub fn new(runner: ProcessRunner<E, S>, concurrency_levels: Vec<u32>, warmup_count: u32) -> Self {
        Self {
            runner,
            concurrency_levels,
            warmup_count,
        }
    }

    pub fn from_settings(runner: ProcessRunner<E, S>, settings: &SweepSettings) -> Self {
        Self::new(
            runner,
            settings.concurrency_levels.clone(),
            settings.warmup_count,
        )
    }

    pub fn concurrency_levels(&self) -> &[u32] {
        &self.concurrency_levels
    }

    /// Run every level exactly once.
    ///
    /// The returned series has one point per level, in level order. Failed
    /// levels are zero-filled, not omitted, and there are no retries.
    pub async fn run(&self, config: &BenchmarkConfig) -> SweepResult {
        let mut result = SweepResult {
            points: Vec::with_capacity(self.concurrency_levels.len()),
        };

        tracing::info!(
            "=== Starting sweep over {} concurrency levels ===",
            self.concurrency_levels.len()
        );

        for &threads in &self.concurrency_levels {
            let total_requests = config.total_requests(threads);
            tracing::info!(
                "Running benchmark at {} threads ({} requests)...",
                threads,
                total_requests
            );

            let point = match self
                .runner
                .run(config, threads, total_requests, self.warmup_count)
                .await
            {
                Ok(metrics) => {
                    tracing::info!(
                        "  [Threads: {}] QPS: {:.2}, Latency: {:.2} ms",
                        threads,
                        metrics.qps,
                        metrics.avg_latency_ms
                    );
                    SweepPoint {
                        thread_count: threads,
                        total_requests,
                        qps: metrics.qps,
                        avg_latency_ms: metrics.avg_latency_ms,
                        succeeded: true,
                        avg_cpu_usage: metrics.avg_cpu_usage,
                        peak_memory_mb: metrics.peak_memory_mb,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::warn!("  [Threads: {}] Failed: {}", threads, e);
                    SweepPoint::failed(threads, total_requests, e.to_string())
                }
            };

            result.points.push(point);
        }

        result
    }
}
