// src/main.rs

mod benchmark_cli;

use env_logger::Env;
use log::error;
use std::process::ExitCode;

use benchmark_cli::{load_config, run_benchmarks, run_compare, run_visualize, USAGE};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("");

    let config_arg = match command {
        "bench" | "all" => args.get(2),
        _ => None,
    };
    let config = match load_config(config_arg) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str())).init();

    let result = match command {
        "bench" => run_benchmarks(&config),
        "visualize" => run_visualize(&config, args.get(2)),
        "all" => run_benchmarks(&config).and_then(|_| run_visualize(&config, None)),
        "compare" => run_compare(&args[2..]),
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
