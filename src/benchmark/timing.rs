// src/benchmark/timing.rs
//
// Timing and speedup tables. All tables are keyed by problem size, and the
// parallel-shaped ones by thread count underneath; values are seconds (timings)
// or dimensionless ratios (speedups).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean sequential time per problem size
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequentialTimings {
    times: BTreeMap<u32, f64>,
}

/// Mean parallel time per problem size and thread count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParallelTimings {
    times: BTreeMap<u32, BTreeMap<u32, f64>>,
}

/// `sequential / parallel` per problem size and thread count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeedupTable {
    speedups: BTreeMap<u32, BTreeMap<u32, f64>>,
}

impl SequentialTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, problem_size: u32, seconds: f64) {
        self.times.insert(problem_size, seconds);
    }

    pub fn get(&self, problem_size: u32) -> Option<f64> {
        self.times.get(&problem_size).copied()
    }

    pub fn problem_sizes(&self) -> impl Iterator<Item = u32> + '_ {
        self.times.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.times.iter().map(|(&size, &secs)| (size, secs))
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl FromIterator<(u32, f64)> for SequentialTimings {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        SequentialTimings {
            times: iter.into_iter().collect(),
        }
    }
}

macro_rules! nested_table {
    ($ty:ident, $field:ident) => {
        impl $ty {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn insert(&mut self, problem_size: u32, thread_count: u32, value: f64) {
                self.$field
                    .entry(problem_size)
                    .or_default()
                    .insert(thread_count, value);
            }

            pub fn get(&self, problem_size: u32, thread_count: u32) -> Option<f64> {
                self.$field
                    .get(&problem_size)
                    .and_then(|row| row.get(&thread_count))
                    .copied()
            }

            /// All values for one problem size, ordered by thread count
            pub fn row(&self, problem_size: u32) -> Option<&BTreeMap<u32, f64>> {
                self.$field.get(&problem_size)
            }

            pub fn problem_sizes(&self) -> impl Iterator<Item = u32> + '_ {
                self.$field.keys().copied()
            }

            pub fn rows(&self) -> impl Iterator<Item = (u32, &BTreeMap<u32, f64>)> + '_ {
                self.$field.iter().map(|(&size, row)| (size, row))
            }

            /// Flattened `(problem_size, thread_count, value)` triples
            pub fn entries(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
                self.$field.iter().flat_map(|(&size, row)| {
                    row.iter().map(move |(&threads, &value)| (size, threads, value))
                })
            }

            pub fn len(&self) -> usize {
                self.$field.values().map(BTreeMap::len).sum()
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }

        impl FromIterator<(u32, u32, f64)> for $ty {
            fn from_iter<I: IntoIterator<Item = (u32, u32, f64)>>(iter: I) -> Self {
                let mut table = $ty::new();
                for (size, threads, value) in iter {
                    table.insert(size, threads, value);
                }
                table
            }
        }
    };
}

nested_table!(ParallelTimings, times);
nested_table!(SpeedupTable, speedups);
