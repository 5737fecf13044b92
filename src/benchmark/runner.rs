// src/benchmark/runner.rs

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::benchmark::report::plot_speedups;
use crate::benchmark::results::BenchmarkSuite;
use crate::benchmark::speedup::compute_speedups;
use crate::benchmark::timer::{SolverCommand, Timer};
use crate::benchmark::timing::{ParallelTimings, SequentialTimings};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};

/// One benchmark trial; sequential trials have no thread count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub problem_size: u32,
    pub thread_count: Option<u32>,
}

/// A single elapsed-time sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub configuration: Configuration,
    /// 1-based repetition index
    pub repetition: u32,
    pub seconds: f64,
}

/// Drives a [`Timer`] over the problem-size × thread-count grid.
///
/// Configurations run strictly one after another: sizes in the given order,
/// then thread counts in the given order, then repetitions. The first failing
/// repetition aborts the whole run and no table is returned.
pub struct BenchmarkRunner<T: Timer> {
    timer: T,
    measurements: Vec<Measurement>,
}

impl<T: Timer> BenchmarkRunner<T> {
    pub fn new(timer: T) -> Self {
        BenchmarkRunner {
            timer,
            measurements: Vec::new(),
        }
    }

    /// Mean sequential time for every problem size
    pub fn run_sequential(
        &mut self,
        problem_sizes: &[u32],
        average_over: u32,
        template: &SolverCommand,
    ) -> Result<SequentialTimings> {
        check_repetitions(average_over)?;
        check_distinct("problem_sizes", problem_sizes)?;
        template.require_sequential()?;

        println!("\n{}", "=".repeat(80));
        println!("Running sequential benchmarks...");
        println!("{}", "=".repeat(80));

        let mut times = SequentialTimings::new();
        for &problem_size in problem_sizes {
            println!("{}", "-".repeat(80));
            let configuration = Configuration {
                problem_size,
                thread_count: None,
            };
            let mean = self.measure(configuration, average_over, template, "sequential")?;
            times.insert(problem_size, mean);
        }
        println!("{}", "-".repeat(80));

        info!("Sequential timings complete for {} problem sizes", times.len());
        Ok(times)
    }

    /// Mean parallel time for every problem size and thread count
    pub fn run_parallel(
        &mut self,
        problem_sizes: &[u32],
        thread_counts: &[u32],
        average_over: u32,
        template: &SolverCommand,
        mode: &str,
    ) -> Result<ParallelTimings> {
        check_repetitions(average_over)?;
        check_distinct("problem_sizes", problem_sizes)?;
        check_distinct("thread_counts", thread_counts)?;
        template.require_parallel()?;

        println!("\n{}", "=".repeat(80));
        println!("Running parallel benchmarks ({})...", mode);
        println!("{}", "=".repeat(80));

        let mut times = ParallelTimings::new();
        for &problem_size in problem_sizes {
            println!("{}", "-".repeat(80));
            for &thread_count in thread_counts {
                let configuration = Configuration {
                    problem_size,
                    thread_count: Some(thread_count),
                };
                let mean = self.measure(configuration, average_over, template, mode)?;
                times.insert(problem_size, thread_count, mean);
            }
        }
        println!("{}", "-".repeat(80));

        info!("Parallel timings complete for {} configurations ({})", times.len(), mode);
        Ok(times)
    }

    /// Every sample taken so far, in execution order
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    fn measure(
        &mut self,
        configuration: Configuration,
        average_over: u32,
        template: &SolverCommand,
        mode: &str,
    ) -> Result<f64> {
        let command = template.render(configuration.problem_size, configuration.thread_count)?;
        let mut total = 0.0;

        for repetition in 1..=average_over {
            let seconds = self.timer.time(&command)?;
            total += seconds;

            match configuration.thread_count {
                Some(threads) => println!(
                    "Using command - {}. Mode: {}, Problem size: {}, Thread num: {}, Iteration: {}, Time: {}s",
                    command, mode, configuration.problem_size, threads, repetition, seconds
                ),
                None => println!(
                    "Using command - {}. Mode: {}, Problem size: {}, Iteration: {}, Time: {}s",
                    command, mode, configuration.problem_size, repetition, seconds
                ),
            }

            self.measurements.push(Measurement {
                configuration,
                repetition,
                seconds,
            });
        }

        let mean = total / average_over as f64;
        debug!("{:?} averaged {}s over {} runs", configuration, mean, average_over);
        Ok(mean)
    }
}

/// Sequential timings, parallel timings, speedups and the chart for one mode.
///
/// Results are written only after every configuration has been measured; a
/// failure anywhere leaves no chart or result files behind.
pub fn run_benchmark_suite<T: Timer>(timer: T, config: &HarnessConfig) -> Result<BenchmarkSuite> {
    config.validate()?;
    let bench = &config.benchmark;

    let sequential_command = SolverCommand::parse(&bench.sequential_command)?;
    let parallel_command = SolverCommand::parse(&bench.parallel_command)?;

    let mut suite = BenchmarkSuite::new(&bench.mode, &bench.problem_sizes, &bench.thread_counts, bench.average_over);
    let mut runner = BenchmarkRunner::new(timer);

    suite.sequential = runner.run_sequential(&bench.problem_sizes, bench.average_over, &sequential_command)?;
    println!("Sequential times: {:?}\n", suite.sequential);

    suite.parallel = runner.run_parallel(
        &bench.problem_sizes,
        &bench.thread_counts,
        bench.average_over,
        &parallel_command,
        &bench.mode,
    )?;
    println!("Parallel times for {}: {:?}\n", bench.mode, suite.parallel);

    suite.speedups = compute_speedups(&suite.sequential, &suite.parallel)?;
    println!("Speedups for {}: {:?}\n", bench.mode, suite.speedups);
    suite.measurements = runner.measurements().to_vec();

    let output_dir = Path::new(&bench.output_dir);
    std::fs::create_dir_all(output_dir)?;

    println!("Plotting speedups for {}...", bench.mode);
    plot_speedups(&bench.thread_counts, &suite.speedups, &bench.mode, output_dir, &config.plot)?;

    if bench.save_results {
        let stem = suite.default_stem(output_dir);
        suite.save_to_file(stem.with_extension("json"))?;
        suite.export_csv(stem.with_extension("csv"))?;
        info!("Results saved to {}.{{json,csv}}", stem.display());
    }

    Ok(suite)
}

/// Compare the speedups of two saved suites, configuration by configuration
pub fn compare_benchmarks<P: AsRef<Path>>(baseline_path: P, current_path: P) -> Result<()> {
    let baseline = BenchmarkSuite::load_from_file(baseline_path)?;
    let current = BenchmarkSuite::load_from_file(current_path)?;

    println!("\n{}", "=".repeat(80));
    println!("BENCHMARK COMPARISON");
    println!("{}", "=".repeat(80));
    println!("\nBaseline: {} {} ({})", baseline.mode, baseline.timestamp, baseline.system_info.git.short_commit());
    println!("Current:  {} {} ({})", current.mode, current.timestamp, current.system_info.git.short_commit());

    println!("\n{}", "-".repeat(80));
    println!("{:<15} {:>10} {:>18} {:>18}", "Problem size", "Threads", "Baseline speedup", "Current speedup");
    println!("{}", "-".repeat(80));

    for (problem_size, thread_count, speedup) in current.speedups.entries() {
        if let Some(previous) = baseline.speedups.get(problem_size, thread_count) {
            println!("{:<15} {:>10} {:>17.2}x {:>17.2}x", problem_size, thread_count, previous, speedup);
        }
    }

    println!("{}", "=".repeat(80));
    Ok(())
}

/// Each configuration is measured once; a repeated key would overwrite its own mean
pub(crate) fn check_distinct(name: &str, values: &[u32]) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    if let Some(dup) = values.iter().find(|&&v| !seen.insert(v)) {
        return Err(HarnessError::InvalidArgument(format!(
            "{} lists {} more than once",
            name, dup
        )));
    }
    Ok(())
}

fn check_repetitions(average_over: u32) -> Result<()> {
    if average_over == 0 {
        return Err(HarnessError::InvalidArgument(
            "average_over must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::timer::RenderedCommand;
    use std::collections::VecDeque;

    /// Replays scripted samples and records the commands it was asked to run
    struct ScriptedTimer {
        samples: VecDeque<Result<f64>>,
        commands: Vec<String>,
    }

    impl ScriptedTimer {
        fn new(samples: Vec<f64>) -> Self {
            ScriptedTimer {
                samples: samples.into_iter().map(Ok).collect(),
                commands: Vec::new(),
            }
        }
    }

    impl Timer for ScriptedTimer {
        fn time(&mut self, command: &RenderedCommand) -> Result<f64> {
            self.commands.push(command.to_string());
            self.samples
                .pop_front()
                .unwrap_or_else(|| Err(HarnessError::process(command.to_string(), "script exhausted")))
        }
    }

    fn seq_template() -> SolverCommand {
        SolverCommand::parse("solver {size}").unwrap()
    }

    fn par_template() -> SolverCommand {
        SolverCommand::parse("solver {size} {threads}").unwrap()
    }

    #[test]
    fn test_run_benchmark_suite_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::default();
        config.benchmark.problem_sizes = vec![100, 500];
        config.benchmark.thread_counts = vec![2];
        config.benchmark.average_over = 1;
        config.benchmark.sequential_command = "solver {size}".to_string();
        config.benchmark.parallel_command = "solver {size} {threads}".to_string();
        config.benchmark.output_dir = dir.path().to_str().unwrap().to_string();
        config.benchmark.save_results = false;

        // sequential 100, sequential 500, parallel 100x2, parallel 500x2
        let timer = ScriptedTimer::new(vec![2.0, 10.0, 1.0, 5.0]);
        let suite = run_benchmark_suite(timer, &config).unwrap();

        assert_eq!(suite.speedups.get(100, 2), Some(2.0));
        assert_eq!(suite.speedups.get(500, 2), Some(2.0));
        assert_eq!(suite.measurements.len(), 4);
        assert!(dir.path().join("MapReduce-speedup.png").exists());
    }

    #[test]
    fn test_failed_suite_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::default();
        config.benchmark.problem_sizes = vec![100];
        config.benchmark.thread_counts = vec![2];
        config.benchmark.average_over = 1;
        config.benchmark.sequential_command = "solver {size}".to_string();
        config.benchmark.parallel_command = "solver {size} {threads}".to_string();
        config.benchmark.output_dir = dir.path().to_str().unwrap().to_string();

        // script runs out before the parallel run
        let result = run_benchmark_suite(ScriptedTimer::new(vec![2.0]), &config);
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_sequential_mean_of_repetitions() {
        let mut runner = BenchmarkRunner::new(ScriptedTimer::new(vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0]));
        let times = runner.run_sequential(&[100, 500], 3, &seq_template()).unwrap();

        assert_eq!(times.get(100), Some(2.0));
        assert_eq!(times.get(500), Some(20.0));
        assert_eq!(runner.measurements().len(), 6);
    }

    #[test]
    fn test_single_repetition_is_exact() {
        let sample = 0.123_456_789;
        let mut runner = BenchmarkRunner::new(ScriptedTimer::new(vec![sample]));
        let times = runner.run_sequential(&[100], 1, &seq_template()).unwrap();
        assert_eq!(times.get(100), Some(sample));
    }

    #[test]
    fn test_mean_for_many_repetition_counts() {
        for n in 1..=8u32 {
            let samples: Vec<f64> = (0..n).map(|i| 0.5 + i as f64 * 0.25).collect();
            let expected = samples.iter().sum::<f64>() / n as f64;

            let mut runner = BenchmarkRunner::new(ScriptedTimer::new(samples));
            let times = runner.run_sequential(&[42], n, &seq_template()).unwrap();
            assert!((times.get(42).unwrap() - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_parallel_iteration_order() {
        let samples = vec![1.0; 8];
        let mut runner = BenchmarkRunner::new(ScriptedTimer::new(samples));
        let times = runner
            .run_parallel(&[500, 100], &[4, 2], 2, &par_template(), "MapReduce")
            .unwrap();

        assert_eq!(
            runner.timer.commands,
            vec![
                "solver 500 4", "solver 500 4",
                "solver 500 2", "solver 500 2",
                "solver 100 4", "solver 100 4",
                "solver 100 2", "solver 100 2",
            ]
        );
        assert_eq!(times.len(), 4);
        assert_eq!(runner.measurements()[1].repetition, 2);
        assert_eq!(runner.measurements()[2].configuration.thread_count, Some(2));
    }

    #[test]
    fn test_parallel_means() {
        let mut runner = BenchmarkRunner::new(ScriptedTimer::new(vec![1.0, 3.0, 0.5, 1.5]));
        let times = runner
            .run_parallel(&[100], &[2, 4], 2, &par_template(), "MapReduce")
            .unwrap();
        assert_eq!(times.get(100, 2), Some(2.0));
        assert_eq!(times.get(100, 4), Some(1.0));
    }

    #[test]
    fn test_failure_discards_whole_run() {
        let mut timer = ScriptedTimer::new(vec![1.0, 1.0]);
        timer.samples.push_back(Err(HarnessError::process("solver 500", "exited with 1")));
        timer.samples.push_back(Ok(1.0));

        let mut runner = BenchmarkRunner::new(timer);
        let result = runner.run_sequential(&[100, 500], 2, &seq_template());

        assert!(matches!(result, Err(HarnessError::ProcessExecution { .. })));
        // no retry after the failing call
        assert_eq!(runner.timer.commands.len(), 3);
    }

    #[test]
    fn test_zero_repetitions_rejected() {
        let mut runner = BenchmarkRunner::new(ScriptedTimer::new(vec![]));
        let result = runner.run_sequential(&[100], 0, &seq_template());
        assert!(matches!(result, Err(HarnessError::InvalidArgument(_))));
        assert!(runner.timer.commands.is_empty());
    }

    #[test]
    fn test_duplicate_problem_size_rejected() {
        let mut runner = BenchmarkRunner::new(ScriptedTimer::new(vec![1.0, 9.0]));
        let result = runner.run_sequential(&[100, 100], 1, &seq_template());
        assert!(matches!(result, Err(HarnessError::InvalidArgument(_))));
        assert!(runner.timer.commands.is_empty());
        assert!(runner.measurements().is_empty());
    }

    #[test]
    fn test_duplicate_thread_count_rejected() {
        let mut runner = BenchmarkRunner::new(ScriptedTimer::new(vec![1.0, 9.0]));
        let result = runner.run_parallel(&[100], &[2, 4, 2], 1, &par_template(), "MapReduce");
        assert!(matches!(result, Err(HarnessError::InvalidArgument(_))));
        assert!(runner.timer.commands.is_empty());
    }

    #[test]
    fn test_parallel_requires_thread_placeholder() {
        let mut runner = BenchmarkRunner::new(ScriptedTimer::new(vec![1.0]));
        let result = runner.run_parallel(&[100], &[2], 1, &seq_template(), "MapReduce");
        assert!(matches!(result, Err(HarnessError::InvalidTemplate(_))));
    }
}
