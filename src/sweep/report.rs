//! Report generation for sweep results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::BenchmarkConfig;
use super::controller::{SweepPoint, SweepResult};

/// Summary of one sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub generated_at: DateTime<Utc>,
    pub host: Option<String>,
    pub model: String,
    pub requests_per_thread: u64,
    /// Points in sweep order
    pub points: Vec<SweepPoint>,
    /// Highest QPS among successful levels
    pub peak_qps: Option<f64>,
    /// Thread count at peak QPS
    pub peak_qps_threads: Option<u32>,
    /// QPS ratio of the last successful level to the first
    pub scaling_factor: Option<f64>,
    pub failures: usize,
}

impl SweepReport {
    /// Create a report from a finished sweep
    pub fn from_result(config: &BenchmarkConfig, result: &SweepResult) -> Self {
        let succeeded: Vec<&SweepPoint> = result.points.iter().filter(|p| p.succeeded).collect();

        let peak = succeeded
            .iter()
            .max_by(|a, b| a.qps.partial_cmp(&b.qps).unwrap_or(std::cmp::Ordering::Equal));

        let scaling_factor = match (succeeded.first(), succeeded.last()) {
            (Some(first), Some(last)) if first.qps > 0.0 => Some(last.qps / first.qps),
            _ => None,
        };

        Self {
            generated_at: Utc::now(),
            host: hostname::get()
                .ok()
                .map(|h| h.to_string_lossy().to_string()),
            model: config.model_path.display().to_string(),
            requests_per_thread: config.requests_per_thread_base,
            points: result.points.clone(),
            peak_qps: peak.map(|p| p.qps),
            peak_qps_threads: peak.map(|p| p.thread_count),
            scaling_factor,
            failures: result.failure_count(),
        }
    }

    /// Print the report as an ASCII table
    pub fn print_table(&self) {
        println!();
        println!("╔══════════════════════════════════════════════════════════════════════════════╗");
        println!("║                        INFERBENCH CONCURRENCY SWEEP                          ║");
        println!("╚══════════════════════════════════════════════════════════════════════════════╝");
        println!();
        println!("  Model:    {}", self.model);
        if let Some(host) = &self.host {
            println!("  Host:     {}", host);
        }
        println!("  Requests: {} per thread", self.requests_per_thread);
        println!();
        println!("┌──────────┬──────────┬────────────┬──────────────┬──────────┬────────────┬────────┐");
        println!("│ Threads  │ Requests │    QPS     │ Latency (ms) │ CPU(avg) │ Memory(MB) │ Status │");
        println!("├──────────┼──────────┼────────────┼──────────────┼──────────┼────────────┼────────┤");

        for point in &self.points {
            println!(
                "│ {:>8} │ {:>8} │ {:>10.2} │ {:>12.2} │ {:>8} │ {:>10} │ {:<6} │",
                point.thread_count,
                point.total_requests,
                point.qps,
                point.avg_latency_ms,
                format_optional(point.avg_cpu_usage, "%"),
                format_optional(point.peak_memory_mb, ""),
                if point.succeeded { "ok" } else { "FAILED" },
            );
        }

        println!("└──────────┴──────────┴────────────┴──────────────┴──────────┴────────────┴────────┘");
        println!();
        self.print_summary();
    }

    /// Print a compact summary
    pub fn print_summary(&self) {
        match (self.peak_qps, self.peak_qps_threads) {
            (Some(qps), Some(threads)) => {
                println!("Peak QPS: {:.1} at {} threads", qps, threads);
            }
            _ => println!("Peak QPS: N/A (no level succeeded)"),
        }

        if let Some(factor) = self.scaling_factor {
            println!("QPS scaling: {:.1}x across successful levels", factor);
        }

        if self.failures > 0 {
            println!(
                "Failed levels: {} of {} (plotted as zero)",
                self.failures,
                self.points.len()
            );
        }
    }

    /// Export the report as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn format_optional(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, suffix),
        None => "-".to_string(),
    }
}
