// src/benchmark/speedup.rs

use crate::benchmark::timing::{ParallelTimings, SequentialTimings, SpeedupTable};
use crate::error::{HarnessError, Result};

/// Speedup of one parallel run over the sequential run of the same size
pub fn speedup(sequential_time: f64, parallel_time: f64) -> f64 {
    sequential_time / parallel_time
}

/// Combine both timing tables into `sequential / parallel` ratios.
///
/// Every problem size in `parallel` must have a sequential timing, and no
/// parallel timing may be zero. Sequential sizes with no parallel counterpart
/// are ignored.
pub fn compute_speedups(
    sequential: &SequentialTimings,
    parallel: &ParallelTimings,
) -> Result<SpeedupTable> {
    let mut speedups = SpeedupTable::new();

    for (problem_size, row) in parallel.rows() {
        let sequential_time = sequential
            .get(problem_size)
            .ok_or(HarnessError::KeyMismatch { problem_size })?;

        for (&thread_count, &parallel_time) in row {
            if parallel_time == 0.0 {
                return Err(HarnessError::DivisionByZero {
                    problem_size,
                    thread_count,
                });
            }
            speedups.insert(problem_size, thread_count, speedup(sequential_time, parallel_time));
        }
    }

    Ok(speedups)
}
