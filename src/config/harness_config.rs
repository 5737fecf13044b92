// src/config/harness_config.rs

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::benchmark::runner::check_distinct;
use crate::benchmark::timer::SolverCommand;
use crate::error::{HarnessError, Result};

/// Main harness configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Logging level (error, warn, info, debug, trace)
    pub log_level: String,

    /// Benchmark grid and solver invocation
    pub benchmark: BenchmarkConfig,

    /// Speedup chart appearance
    pub plot: PlotConfig,

    /// Snapshot rendering and animation
    pub visualization: VisualizationConfig,
}

/// What to run and how often
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Problem sizes, benchmarked in this order
    pub problem_sizes: Vec<u32>,

    /// Thread counts for the parallel runs, benchmarked in this order
    pub thread_counts: Vec<u32>,

    /// Repetitions averaged into each timing (must be >= 1)
    pub average_over: u32,

    /// Sequential solver template, must contain `{size}`
    pub sequential_command: String,

    /// Parallel solver template, must contain `{size}` and `{threads}`
    pub parallel_command: String,

    /// Label for the parallel strategy, used in titles and file names
    pub mode: String,

    /// Where `<mode>-speedup.png` and result files are written
    pub output_dir: String,

    /// Kill the solver after this many seconds (default: wait forever)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Persist a JSON + CSV record of every run
    pub save_results: bool,
}

/// Speedup chart appearance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,

    /// Chart title, `{mode}` is replaced by the benchmark mode
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub line_width: u32,
}

/// Snapshot rendering and animation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    /// Directory the solver writes its snapshots to
    pub output_dir: String,

    /// Extension of the solver's textual dumps
    pub snapshot_extension: String,

    /// Extension of rendered frames
    pub image_extension: String,

    /// Intermediate frames are named `<frame_prefix><iteration>.<image_extension>`
    pub frame_prefix: String,

    /// Boundary artifacts (initial and target state) kept through cleanup
    pub reserved_stems: Vec<String>,

    /// File name of the assembled animation
    pub movie_name: String,

    pub frame_title: String,
    pub frame_width: u32,
    pub frame_height: u32,

    /// Delay between animation frames in milliseconds
    pub frame_delay_ms: u32,

    /// Remove snapshots and intermediate frames once the animation exists
    pub cleanup: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            log_level: "info".to_string(),
            benchmark: BenchmarkConfig::default(),
            plot: PlotConfig::default(),
            visualization: VisualizationConfig::default(),
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            problem_sizes: vec![100, 500, 1000],
            thread_counts: vec![2, 4, 6, 8, 12],
            average_over: 5,
            sequential_command: "go run ../simulator/simulator.go {size}".to_string(),
            parallel_command: "go run ../simulator/simulator.go {size} {threads}".to_string(),
            mode: "MapReduce".to_string(),
            output_dir: ".".to_string(),
            timeout_secs: None,
            save_results: true,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            width: 1024,
            height: 768,
            title: "Sparse Matrix Solver using Conjugate Gradient ({mode})".to_string(),
            xlabel: "Number of threads".to_string(),
            ylabel: "Speedup".to_string(),
            line_width: 2,
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        VisualizationConfig {
            output_dir: "./output".to_string(),
            snapshot_extension: "txt".to_string(),
            image_extension: "png".to_string(),
            frame_prefix: "x_".to_string(),
            reserved_stems: vec!["x".to_string(), "b".to_string()],
            movie_name: "movie.gif".to_string(),
            frame_title: "Conjugate Gradient Plot".to_string(),
            frame_width: 800,
            frame_height: 600,
            frame_delay_ms: 100,
            cleanup: true,
        }
    }
}

impl PlotConfig {
    /// Chart title for one benchmark mode
    pub fn title_for(&self, mode: &str) -> String {
        self.title.replace("{mode}", mode)
    }
}

impl VisualizationConfig {
    /// File names of the boundary frames that survive cleanup
    pub fn reserved_frame_names(&self) -> Vec<String> {
        self.reserved_stems
            .iter()
            .map(|stem| format!("{}.{}", stem, self.image_extension))
            .collect()
    }
}

impl HarnessConfig {
    /// Load configuration with precedence: env vars → config file → defaults
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        // TOML preferred, YAML fallback
        if Path::new("cg_harness.toml").exists() {
            builder = builder.add_source(File::with_name("cg_harness.toml"));
        } else if Path::new("cg_harness.yaml").exists() {
            builder = builder.add_source(File::with_name("cg_harness.yaml"));
        }

        Self::finish(builder)
    }

    /// Load configuration with custom file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        Self::finish(builder)
    }

    fn defaults() -> std::result::Result<ConfigBuilder<DefaultState>, ConfigError> {
        let bench = BenchmarkConfig::default();
        let plot = PlotConfig::default();
        let vis = VisualizationConfig::default();

        let sizes: Vec<i64> = bench.problem_sizes.iter().map(|&s| s as i64).collect();
        let threads: Vec<i64> = bench.thread_counts.iter().map(|&t| t as i64).collect();

        Config::builder()
            .set_default("log_level", "info")?
            .set_default("benchmark.problem_sizes", sizes)?
            .set_default("benchmark.thread_counts", threads)?
            .set_default("benchmark.average_over", bench.average_over as i64)?
            .set_default("benchmark.sequential_command", bench.sequential_command)?
            .set_default("benchmark.parallel_command", bench.parallel_command)?
            .set_default("benchmark.mode", bench.mode)?
            .set_default("benchmark.output_dir", bench.output_dir)?
            .set_default("benchmark.save_results", bench.save_results)?
            .set_default("plot.width", plot.width as i64)?
            .set_default("plot.height", plot.height as i64)?
            .set_default("plot.title", plot.title)?
            .set_default("plot.xlabel", plot.xlabel)?
            .set_default("plot.ylabel", plot.ylabel)?
            .set_default("plot.line_width", plot.line_width as i64)?
            .set_default("visualization.output_dir", vis.output_dir)?
            .set_default("visualization.snapshot_extension", vis.snapshot_extension)?
            .set_default("visualization.image_extension", vis.image_extension)?
            .set_default("visualization.frame_prefix", vis.frame_prefix)?
            .set_default("visualization.reserved_stems", vis.reserved_stems)?
            .set_default("visualization.movie_name", vis.movie_name)?
            .set_default("visualization.frame_title", vis.frame_title)?
            .set_default("visualization.frame_width", vis.frame_width as i64)?
            .set_default("visualization.frame_height", vis.frame_height as i64)?
            .set_default("visualization.frame_delay_ms", vis.frame_delay_ms as i64)?
            .set_default("visualization.cleanup", vis.cleanup)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> std::result::Result<Self, ConfigError> {
        // Override with environment variables (prefix: CG_HARNESS, nesting: __)
        let builder = builder.add_source(
            Environment::with_prefix("CG_HARNESS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("benchmark.problem_sizes")
                .with_list_parse_key("benchmark.thread_counts")
                .with_list_parse_key("visualization.reserved_stems"),
        );

        builder.build()?.try_deserialize()
    }

    /// Reject grids and templates the runner cannot execute
    pub fn validate(&self) -> Result<()> {
        let bench = &self.benchmark;

        if bench.average_over == 0 {
            return Err(HarnessError::InvalidArgument(
                "average_over must be at least 1".to_string(),
            ));
        }
        if bench.problem_sizes.is_empty() || bench.problem_sizes.contains(&0) {
            return Err(HarnessError::InvalidArgument(
                "problem_sizes must be a non-empty list of positive integers".to_string(),
            ));
        }
        if bench.thread_counts.is_empty() || bench.thread_counts.contains(&0) {
            return Err(HarnessError::InvalidArgument(
                "thread_counts must be a non-empty list of positive integers".to_string(),
            ));
        }

        check_distinct("problem_sizes", &bench.problem_sizes)?;
        check_distinct("thread_counts", &bench.thread_counts)?;

        SolverCommand::parse(&bench.sequential_command)?.require_sequential()?;
        SolverCommand::parse(&bench.parallel_command)?.require_parallel()?;

        if self.visualization.frame_delay_ms == 0 {
            log::warn!("frame_delay_ms is 0, viewers may play the animation at their own default speed");
        }
        Ok(())
    }
}
