//! Configuration structs for a concurrency sweep.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Optimization directive forwarded to the benchmark executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OptimizationLevel {
    None,
    Basic,
    #[default]
    All,
}

impl std::fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationLevel::None => write!(f, "none"),
            OptimizationLevel::Basic => write!(f, "basic"),
            OptimizationLevel::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for OptimizationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(OptimizationLevel::None),
            "basic" => Ok(OptimizationLevel::Basic),
            "all" => Ok(OptimizationLevel::All),
            _ => Err(format!("Unknown optimization level: {}", s)),
        }
    }
}

/// Resolved inputs of one run. Immutable once validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Path to the benchmark executable
    pub executable_path: PathBuf,
    /// Path to the model artifact consumed by the executable
    pub model_path: PathBuf,
    /// Requests per thread; each level runs `base * threads` in total
    pub requests_per_thread_base: u64,
}

/// Sweep parameters that used to be fixed globals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Concurrency levels, swept and reported in this order
    pub concurrency_levels: Vec<u32>,
    /// Warmup requests discarded by the executable before measuring
    pub warmup_count: u32,
    /// Value of the `--optimization` directive
    pub optimization: OptimizationLevel,
    /// Directory receiving `throughput.png` and `latency.png`
    pub output_dir: PathBuf,
    /// Directory for temporary result documents
    pub scratch_dir: PathBuf,
}

/// Default concurrency levels: powers of two up to 16
pub const DEFAULT_CONCURRENCY_LEVELS: [u32; 5] = [1, 2, 4, 8, 16];

/// Default warmup request count
pub const DEFAULT_WARMUP_COUNT: u32 = 10;

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            concurrency_levels: DEFAULT_CONCURRENCY_LEVELS.to_vec(),
            warmup_count: DEFAULT_WARMUP_COUNT,
            optimization: OptimizationLevel::All,
            output_dir: PathBuf::from("."),
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl BenchmarkConfig {
    /// Total requests for one concurrency level
    pub fn total_requests(&self, thread_count: u32) -> u64 {
        self.requests_per_thread_base * u64::from(thread_count)
    }
}
