// src/benchmark/results.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::benchmark::runner::Measurement;
use crate::benchmark::system_info::SystemInfo;
use crate::benchmark::timing::{ParallelTimings, SequentialTimings, SpeedupTable};
use crate::error::Result;

/// Everything one benchmark run produced, in a form that can be saved and compared later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    pub mode: String,
    pub problem_sizes: Vec<u32>,
    pub thread_counts: Vec<u32>,
    pub average_over: u32,
    pub sequential: SequentialTimings,
    pub parallel: ParallelTimings,
    pub speedups: SpeedupTable,
    /// Raw samples behind the means, in execution order
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

/// One CSV line of the exported table
#[derive(Debug, Serialize)]
struct SpeedupRow {
    problem_size: u32,
    thread_count: u32,
    sequential_s: f64,
    parallel_s: f64,
    speedup: f64,
}

impl BenchmarkSuite {
    pub fn new(mode: &str, problem_sizes: &[u32], thread_counts: &[u32], average_over: u32) -> Self {
        BenchmarkSuite {
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            mode: mode.to_string(),
            problem_sizes: problem_sizes.to_vec(),
            thread_counts: thread_counts.to_vec(),
            average_over,
            sequential: SequentialTimings::new(),
            parallel: ParallelTimings::new(),
            speedups: SpeedupTable::new(),
            measurements: Vec::new(),
        }
    }

    /// `benchmark_results_<mode>_<timestamp>` inside `dir`, without extension
    pub fn default_stem(&self, dir: &Path) -> PathBuf {
        dir.join(format!(
            "benchmark_results_{}_{}",
            self.mode,
            self.timestamp.format("%Y%m%d_%H%M%S")
        ))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let suite = serde_json::from_str(&json)?;
        Ok(suite)
    }

    /// One row per (problem size, thread count) with both timings and the speedup
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for (problem_size, thread_count, speedup) in self.speedups.entries() {
            writer.serialize(SpeedupRow {
                problem_size,
                thread_count,
                sequential_s: self.sequential.get(problem_size).unwrap_or(f64::NAN),
                parallel_s: self.parallel.get(problem_size, thread_count).unwrap_or(f64::NAN),
                speedup,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("BENCHMARK RESULTS ({})", self.mode);
        println!("{}", "=".repeat(80));
        println!("\nTimestamp: {}", self.timestamp);
        println!("Averaged over: {} runs", self.average_over);
        println!("{}", self.system_info.to_string_pretty());

        println!("{}", "-".repeat(80));
        println!("{:<15} {:>10} {:>18} {:>18} {:>12}", "Problem size", "Threads", "Sequential (s)", "Parallel (s)", "Speedup");
        println!("{}", "-".repeat(80));

        for (problem_size, thread_count, speedup) in self.speedups.entries() {
            let seq = self.sequential.get(problem_size).map(format_seconds).unwrap_or_else(|| "-".to_string());
            let par = self
                .parallel
                .get(problem_size, thread_count)
                .map(format_seconds)
                .unwrap_or_else(|| "-".to_string());
            println!("{:<15} {:>10} {:>18} {:>18} {:>11.2}x", problem_size, thread_count, seq, par, speedup);
        }

        println!("{}", "=".repeat(80));
    }
}

fn format_seconds(secs: f64) -> String {
    if secs < 1e-3 {
        format!("{:.2} µs", secs * 1e6)
    } else if secs < 1.0 {
        format!("{:.2} ms", secs * 1e3)
    } else {
        format!("{:.3} s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::runner::Configuration;

    fn sample_suite() -> BenchmarkSuite {
        let mut suite = BenchmarkSuite::new("MapReduce", &[100, 500], &[2], 1);
        suite.sequential = [(100, 2.0), (500, 10.0)].into_iter().collect();
        suite.parallel = [(100, 2, 1.0), (500, 2, 5.0)].into_iter().collect();
        suite.speedups = [(100, 2, 2.0), (500, 2, 2.0)].into_iter().collect();
        suite.measurements.push(Measurement {
            configuration: Configuration {
                problem_size: 100,
                thread_count: None,
            },
            repetition: 1,
            seconds: 2.0,
        });
        suite
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let suite = sample_suite();
        suite.save_to_file(&path).unwrap();

        let loaded = BenchmarkSuite::load_from_file(&path).unwrap();
        assert_eq!(loaded.mode, "MapReduce");
        assert_eq!(loaded.speedups, suite.speedups);
        assert_eq!(loaded.sequential, suite.sequential);
        assert_eq!(loaded.measurements, suite.measurements);
    }

    #[test]
    fn test_export_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        sample_suite().export_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "problem_size,thread_count,sequential_s,parallel_s,speedup");
        assert_eq!(lines[1], "100,2,2.0,1.0,2.0");
        assert_eq!(lines[2], "500,2,10.0,5.0,2.0");
    }

    #[test]
    fn test_default_stem_contains_mode() {
        let suite = sample_suite();
        let stem = suite.default_stem(Path::new("."));
        let name = stem.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("benchmark_results_MapReduce_"));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(2.5), "2.500 s");
        assert_eq!(format_seconds(0.25), "250.00 ms");
        assert_eq!(format_seconds(0.000_5), "500.00 µs");
    }
}
