// src/benchmark/mod.rs

pub mod report;
pub mod results;
pub mod runner;
pub mod speedup;
pub mod system_info;
pub mod timer;
pub mod timing;

pub use report::plot_speedups;
pub use results::BenchmarkSuite;
pub use runner::{compare_benchmarks, run_benchmark_suite, BenchmarkRunner, Configuration, Measurement};
pub use speedup::compute_speedups;
pub use system_info::SystemInfo;
pub use timer::{ProcessTimer, SolverCommand, Timer};
pub use timing::{ParallelTimings, SequentialTimings, SpeedupTable};
