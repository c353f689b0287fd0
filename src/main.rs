use anyhow::Result;

use inferbench_sweep::chart::{ChartRenderer, PlottersRenderer};
use inferbench_sweep::config::Config;
use inferbench_sweep::sweep::{
    FsResultStore, ProcessRunner, SweepController, SweepReport, TokioExecutor,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Fail before any sweep work on bad paths
    config.validate()?;

    tracing::info!(
        "Sweeping {} over threads {:?} ({} requests/thread, warmup {})",
        config.benchmark.executable_path.display(),
        config.settings.concurrency_levels,
        config.benchmark.requests_per_thread_base,
        config.settings.warmup_count
    );

    let runner = ProcessRunner::new(
        TokioExecutor,
        FsResultStore::new(&config.settings.scratch_dir),
        config.settings.optimization,
    );
    let controller = SweepController::from_settings(runner, &config.settings);
    let result = controller.run(&config.benchmark).await;

    let report = SweepReport::from_result(&config.benchmark, &result);
    if config.json {
        println!("{}", report.to_json());
    } else {
        report.print_table();
    }

    let renderer = PlottersRenderer::new(config.font.as_deref());
    renderer.render(&result, &config.settings.output_dir)?;

    Ok(())
}
