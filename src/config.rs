use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::sweep::{BenchmarkConfig, OptimizationLevel, SweepSettings};

/// Concurrency sweep and chart report for inferbench
#[derive(Parser, Debug)]
#[command(name = "inferbench-sweep", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to inferbench executable
    #[arg(long = "bin", env = "INFERBENCH_BIN", default_value = "./build/bin/inferbench")]
    pub bin: String,

    /// Path to ONNX model
    #[arg(short, long, env = "INFERBENCH_MODEL")]
    pub model: String,

    /// Requests per thread
    #[arg(short, long, env = "INFERBENCH_REQUESTS", default_value = "100")]
    pub requests: u64,

    /// Concurrency levels to sweep (comma-separated)
    #[arg(
        short,
        long,
        env = "SWEEP_THREADS",
        default_value = "1,2,4,8,16",
        value_delimiter = ','
    )]
    pub threads: Vec<u32>,

    /// Warmup requests per invocation
    #[arg(short, long, env = "SWEEP_WARMUP", default_value = "10")]
    pub warmup: u32,

    /// Optimization level passed to inferbench (none, basic, all)
    #[arg(long, env = "SWEEP_OPTIMIZATION", default_value = "all")]
    pub optimization: OptimizationLevel,

    /// Directory for throughput.png and latency.png
    #[arg(short, long, env = "SWEEP_OUTPUT_DIR", default_value = ".")]
    pub output_dir: String,

    /// Directory for temporary result files (defaults to the system temp dir)
    #[arg(long, env = "SWEEP_SCRATCH_DIR")]
    pub scratch_dir: Option<String>,

    /// TrueType font for chart text
    #[arg(long, env = "SWEEP_FONT")]
    pub font: Option<String>,

    /// Print the sweep report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub benchmark: BenchmarkConfig,
    pub settings: SweepSettings,

    // Output
    pub font: Option<PathBuf>,
    pub json: bool,
    pub log_level: String,
}

impl Config {
    /// Load configuration with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Self::from_args(CliArgs::parse()))
    }

    pub fn from_args(args: CliArgs) -> Self {
        Config {
            benchmark: BenchmarkConfig {
                executable_path: expand_tilde(&args.bin),
                model_path: expand_tilde(&args.model),
                requests_per_thread_base: args.requests,
            },
            settings: SweepSettings {
                concurrency_levels: args.threads,
                warmup_count: args.warmup,
                optimization: args.optimization,
                output_dir: expand_tilde(&args.output_dir),
                scratch_dir: args
                    .scratch_dir
                    .map(|s| expand_tilde(&s))
                    .unwrap_or_else(std::env::temp_dir),
            },
            font: args.font.map(|s| expand_tilde(&s)),
            json: args.json,
            log_level: args.log_level,
        }
    }

    /// Validate configuration before any sweep work
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.benchmark.executable_path.exists() {
            return Err(ConfigError::MissingExecutable(
                self.benchmark.executable_path.clone(),
            ));
        }

        if !self.benchmark.model_path.exists() {
            return Err(ConfigError::MissingModel(self.benchmark.model_path.clone()));
        }

        if self.settings.concurrency_levels.is_empty() {
            return Err(ConfigError::EmptySweep);
        }

        if self.settings.concurrency_levels.contains(&0) {
            return Err(ConfigError::ZeroConcurrency);
        }

        if self.benchmark.requests_per_thread_base == 0 {
            return Err(ConfigError::ZeroRequests);
        }

        // total_requests() multiplies unchecked
        for &threads in &self.settings.concurrency_levels {
            if self
                .benchmark
                .requests_per_thread_base
                .checked_mul(u64::from(threads))
                .is_none()
            {
                return Err(ConfigError::RequestOverflow {
                    requests: self.benchmark.requests_per_thread_base,
                    threads,
                });
            }
        }

        Ok(())
    }
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["inferbench-sweep"];
        argv.extend_from_slice(args);
        Config::from_args(CliArgs::try_parse_from(argv).unwrap())
    }

    /// Config whose executable and model both exist
    fn existing_paths() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("inferbench");
        let model = dir.path().join("model.onnx");
        std::fs::write(&bin, "").unwrap();
        std::fs::write(&model, "").unwrap();
        let config = parse(&[
            "--bin",
            bin.to_str().unwrap(),
            "--model",
            model.to_str().unwrap(),
        ]);
        (dir, config)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--model", "m.onnx"]);
        assert_eq!(
            config.benchmark.executable_path,
            PathBuf::from("./build/bin/inferbench")
        );
        assert_eq!(config.benchmark.requests_per_thread_base, 100);
        assert_eq!(config.settings.concurrency_levels, vec![1, 2, 4, 8, 16]);
        assert_eq!(config.settings.warmup_count, 10);
        assert_eq!(config.settings.optimization, OptimizationLevel::All);
        assert_eq!(config.settings.output_dir, PathBuf::from("."));
        assert!(!config.json);
    }

    #[test]
    fn test_model_is_required() {
        std::env::remove_var("INFERBENCH_MODEL");
        assert!(CliArgs::try_parse_from(["inferbench-sweep"]).is_err());
    }

    #[test]
    fn test_custom_levels_and_optimization() {
        let config = parse(&[
            "--model",
            "m.onnx",
            "--threads",
            "16,4,1",
            "--optimization",
            "basic",
            "--requests",
            "25",
        ]);
        assert_eq!(config.settings.concurrency_levels, vec![16, 4, 1]);
        assert_eq!(config.settings.optimization, OptimizationLevel::Basic);
        assert_eq!(config.benchmark.requests_per_thread_base, 25);
    }

    #[test]
    fn test_invalid_optimization_rejected() {
        let result = CliArgs::try_parse_from([
            "inferbench-sweep",
            "--model",
            "m.onnx",
            "--optimization",
            "turbo",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_missing_executable() {
        let config = parse(&["--bin", "/no/such/inferbench", "--model", "/no/such/model"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingExecutable(_))
        ));
    }

    #[test]
    fn test_validate_missing_model() {
        let (_dir, mut config) = existing_paths();
        config.benchmark.model_path = PathBuf::from("/no/such/model.onnx");
        assert!(matches!(config.validate(), Err(ConfigError::MissingModel(_))));
    }

    #[test]
    fn test_validate_sweep_shape() {
        let (_dir, mut config) = existing_paths();
        assert!(config.validate().is_ok());

        config.settings.concurrency_levels = vec![1, 0, 4];
        assert!(matches!(config.validate(), Err(ConfigError::ZeroConcurrency)));

        config.settings.concurrency_levels.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptySweep)));

        config.settings.concurrency_levels = vec![1];
        config.benchmark.requests_per_thread_base = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroRequests)));
    }

    #[test]
    fn test_validate_total_request_overflow() {
        let (_dir, mut config) = existing_paths();
        config.benchmark.requests_per_thread_base = u64::MAX / 2 + 1;
        config.settings.concurrency_levels = vec![1, 2];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RequestOverflow { threads: 2, .. })
        ));

        config.settings.concurrency_levels = vec![1];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/models/resnet.onnx");
        assert!(path.to_string_lossy().contains("models/resnet.onnx"));
        assert!(!path.to_string_lossy().starts_with("~"));

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_tilde_just_tilde() {
        // Just "~" without slash should not expand
        let path = expand_tilde("~");
        assert_eq!(path, PathBuf::from("~"));
    }
}
