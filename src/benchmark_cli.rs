// src/benchmark_cli.rs
// Command handling for the binary - kept out of main.rs

use std::path::Path;
use std::time::Duration;

use cg_harness::benchmark::{compare_benchmarks, run_benchmark_suite, ProcessTimer};
use cg_harness::config::HarnessConfig;
use cg_harness::visualize::run_visualization;
use cg_harness::Result;

pub const USAGE: &str = "Usage:
  cg_harness bench [config.toml]              run the speedup benchmark
  cg_harness visualize [output_dir]           render snapshots and assemble the animation
  cg_harness all [config.toml]                benchmark, then visualize
  cg_harness compare <baseline.json> <current.json>";

pub fn load_config(path: Option<&String>) -> Result<HarnessConfig> {
    let config = match path {
        Some(path) => HarnessConfig::load_from_file(path)?,
        None => HarnessConfig::load()?,
    };
    Ok(config)
}

pub fn run_benchmarks(config: &HarnessConfig) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("CONJUGATE GRADIENT SPEEDUP BENCHMARK");
    println!("{}", "=".repeat(80));
    println!("\nProblem sizes: {:?}", config.benchmark.problem_sizes);
    println!("Thread counts: {:?}", config.benchmark.thread_counts);
    println!("Averaged over: {}", config.benchmark.average_over);

    let timer = ProcessTimer::with_timeout(config.benchmark.timeout_secs.map(Duration::from_secs));
    let suite = run_benchmark_suite(timer, config)?;
    suite.print_summary();
    println!("Done!");
    Ok(())
}

pub fn run_visualize(config: &HarnessConfig, dir: Option<&String>) -> Result<()> {
    let dir = dir.map(String::as_str).unwrap_or(&config.visualization.output_dir);
    let report = run_visualization(Path::new(dir), &config.visualization)?;

    println!("Rendered {} frames into {}", report.frames_rendered, report.movie.display());
    if let Some(cleanup) = report.cleanup {
        println!(
            "Removed {} snapshots and {} intermediate frames",
            cleanup.snapshots_removed, cleanup.frames_removed
        );
    }
    Ok(())
}

pub fn run_compare(args: &[String]) -> Result<()> {
    match args {
        [baseline, current] => compare_benchmarks(baseline, current),
        _ => Err(cg_harness::HarnessError::InvalidArgument(
            "compare needs a baseline and a current results file".to_string(),
        )),
    }
}
