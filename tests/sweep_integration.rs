// Integration tests for inferbench-sweep
//
// These drive the real process executor and filesystem result store against
// a shell script standing in for the inferbench executable.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use inferbench_sweep::chart::{ChartRenderer, PlottersRenderer};
use inferbench_sweep::sweep::{
    BenchmarkConfig, FsResultStore, OptimizationLevel, ProcessRunner, SweepController,
    TokioExecutor,
};

// ==================================================================================================
// Test Helpers
// ==================================================================================================

/// Fails with a nonzero exit at 4 threads and writes no result at 8 threads
const FAKE_INFERBENCH: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
    case "$1" in
        --threads) THREADS="$2"; shift 2 ;;
        --requests) REQUESTS="$2"; shift 2 ;;
        --json) JSON="$2"; shift 2 ;;
        *) shift ;;
    esac
done

if [ "$THREADS" = "4" ]; then
    echo "crash at 4 threads" >&2
    exit 1
fi

if [ "$THREADS" = "8" ]; then
    exit 0
fi

cat > "$JSON" <<DOC
{"model": "m", "config": {"threads": $THREADS, "requests": $REQUESTS},
 "result": {"qps": $((THREADS * 100)), "avg_latency_ms": 5.5, "p99_latency_ms": 9.0}}
DOC
"#;

fn write_fake_bin(dir: &Path) -> PathBuf {
    let bin = dir.join("inferbench");
    std::fs::write(&bin, FAKE_INFERBENCH).unwrap();
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
    bin
}

fn write_model(dir: &Path) -> PathBuf {
    let model = dir.join("model.onnx");
    std::fs::write(&model, b"onnx").unwrap();
    model
}

// ==================================================================================================
// Sweep
// ==================================================================================================

#[tokio::test]
async fn test_sweep_with_partial_failures() {
    let dir = tempfile::tempdir().unwrap();
    let scratch = dir.path().join("scratch");
    std::fs::create_dir_all(&scratch).unwrap();

    let config = BenchmarkConfig {
        executable_path: write_fake_bin(dir.path()),
        model_path: write_model(dir.path()),
        requests_per_thread_base: 100,
    };

    let runner = ProcessRunner::new(
        TokioExecutor,
        FsResultStore::new(&scratch),
        OptimizationLevel::All,
    );
    let controller = SweepController::new(runner, vec![1, 2, 4, 8, 16], 10);
    let result = controller.run(&config).await;

    assert_eq!(result.len(), 5);
    assert_eq!(result.thread_counts(), vec![1, 2, 4, 8, 16]);

    let totals: Vec<u64> = result.points.iter().map(|p| p.total_requests).collect();
    assert_eq!(totals, vec![100, 200, 400, 800, 1600]);

    let nonzero_exit = &result.points[2];
    assert!(!nonzero_exit.succeeded);
    assert_eq!(nonzero_exit.qps, 0.0);
    assert_eq!(nonzero_exit.avg_latency_ms, 0.0);
    assert!(nonzero_exit
        .error
        .as_deref()
        .unwrap()
        .contains("crash at 4 threads"));

    let missing_result = &result.points[3];
    assert!(!missing_result.succeeded);
    assert_eq!(missing_result.qps, 0.0);
    assert_eq!(missing_result.avg_latency_ms, 0.0);

    for idx in [0, 1, 4] {
        let point = &result.points[idx];
        assert!(point.succeeded);
        assert_eq!(point.qps, 100.0 * point.thread_count as f64);
        assert_eq!(point.avg_latency_ms, 5.5);
    }

    // Result files of successful runs are gone
    let leftovers: Vec<_> = std::fs::read_dir(&scratch).unwrap().collect();
    assert!(leftovers.is_empty());

    let out = dir.path().join("charts");
    let written = PlottersRenderer::without_text()
        .render(&result, &out)
        .unwrap();
    assert_eq!(written.len(), 2);
    assert!(out.join("throughput.png").is_file());
    assert!(out.join("latency.png").is_file());
}

// ==================================================================================================
// Binary
// ==================================================================================================

fn sweep_command(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_inferbench-sweep"));
    cmd.current_dir(cwd)
        .env_remove("INFERBENCH_BIN")
        .env_remove("INFERBENCH_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_missing_executable_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path());

    let output = sweep_command(dir.path())
        .args(["--bin", "/no/such/inferbench", "--model"])
        .arg(&model)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/no/such/inferbench"));
    assert!(!dir.path().join("throughput.png").exists());
    assert!(!dir.path().join("latency.png").exists());
}

#[test]
fn test_missing_model_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_fake_bin(dir.path());

    let output = sweep_command(dir.path())
        .arg("--bin")
        .arg(&bin)
        .args(["--model", "/no/such/model.onnx"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("throughput.png").exists());
}

#[test]
fn test_sweep_failures_keep_exit_code_zero() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_fake_bin(dir.path());
    let model = write_model(dir.path());
    let out = dir.path().join("out");

    let output = sweep_command(dir.path())
        .arg("--bin")
        .arg(&bin)
        .arg("--model")
        .arg(&model)
        .arg("--output-dir")
        .arg(&out)
        .arg("--scratch-dir")
        .arg(dir.path())
        .arg("--json")
        .output()
        .unwrap();

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let points = report["points"].as_array().unwrap();
    assert_eq!(points.len(), 5);
    assert_eq!(points[2]["succeeded"], false);
    assert_eq!(points[3]["succeeded"], false);
    assert_eq!(report["failures"], 2);
    assert_eq!(report["peak_qps_threads"], 16);

    assert!(out.join("throughput.png").is_file());
    assert!(out.join("latency.png").is_file());
}
