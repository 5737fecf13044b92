// src/visualize/snapshot.rs
//
// Solver state dumps. A dump is a literal pair `[[iteration, ...], grid]`;
// the solver also writes the unbracketed form `[iteration], [[a, b, ], ...]`
// with trailing commas inside rows, and both are accepted here.

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{HarnessError, Result};

/// Rectangular grid of solver values, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

/// One iteration of solver state
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub iteration: u64,
    pub grid: Grid,
}

impl Grid {
    /// Build from nested rows; every row must have the same, non-zero length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> std::result::Result<Self, String> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err("grid is empty".to_string());
        }
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(format!(
                "row {} has {} values, expected {}",
                index,
                row.len(),
                cols
            ));
        }

        Ok(Grid {
            rows: rows.len(),
            cols,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    /// Iterate `(row, col, value)` in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cols = self.cols;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i / cols, i % cols, v))
    }

    /// Smallest and largest value
    pub fn value_range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.cols).map(<[f64]>::to_vec).collect()
    }
}

/// Decode the text of one dump
pub fn parse_snapshot(text: &str) -> std::result::Result<Snapshot, String> {
    let normalized = strip_trailing_commas(text.trim());

    let (header, rows) = match serde_json::from_str::<(Vec<Value>, Vec<Vec<f64>>)>(&normalized) {
        Ok(pair) => pair,
        Err(bracketed_err) => {
            // unbracketed pair as written by the solver
            serde_json::from_str::<(Vec<Value>, Vec<Vec<f64>>)>(&format!("[{}]", normalized))
                .map_err(|_| bracketed_err.to_string())?
        }
    };

    let iteration = header
        .first()
        .ok_or_else(|| "header is empty".to_string())?
        .as_u64()
        .ok_or_else(|| format!("iteration {} is not a non-negative integer", header[0]))?;

    Ok(Snapshot {
        iteration,
        grid: Grid::from_rows(rows)?,
    })
}

/// Read and decode the dump at `path`
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| HarnessError::snapshot(path, e.to_string()))?;
    parse_snapshot(&text).map_err(|reason| HarnessError::snapshot(path, reason))
}

/// Drop commas that directly precede a closing bracket
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == ']' {
            let kept = out.trim_end().len();
            if out[..kept].ends_with(',') {
                out.truncate(kept - 1);
            }
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bracketed_pair() {
        let snapshot = parse_snapshot("[[5, 0], [[1.0,2.0],[3.0,4.0]]]").unwrap();
        assert_eq!(snapshot.iteration, 5);
        assert_eq!(snapshot.grid.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(snapshot.grid.rows(), 2);
        assert_eq!(snapshot.grid.cols(), 2);
    }

    #[test]
    fn test_parse_solver_output() {
        let text = "[12], [[0.000000, 0.250000, ], [-1.500000, 3.000000, ]]";
        let snapshot = parse_snapshot(text).unwrap();
        assert_eq!(snapshot.iteration, 12);
        assert_eq!(snapshot.grid.get(1, 0), Some(-1.5));
        assert_eq!(snapshot.grid.get(0, 1), Some(0.25));
    }

    #[test]
    fn test_parse_integer_values_and_whitespace() {
        let snapshot = parse_snapshot("\n  [[0], [[1, 2, 3]]]\n").unwrap();
        assert_eq!(snapshot.iteration, 0);
        assert_eq!(snapshot.grid.to_rows(), vec![vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn test_missing_closing_bracket() {
        assert!(parse_snapshot("[[5, 0], [[1.0,2.0],[3.0,4.0]]").is_err());
        assert!(parse_snapshot("[5], [[1.0, 2.0]").is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = parse_snapshot("[[5, 0], [[1.0,2.0],[3.0]]]").unwrap_err();
        assert!(err.contains("row 1"));
    }

    #[test]
    fn test_bad_header_rejected() {
        assert!(parse_snapshot("[[], [[1.0]]]").is_err());
        assert!(parse_snapshot("[[-1], [[1.0]]]").is_err());
        assert!(parse_snapshot("[[2.5], [[1.0]]]").is_err());
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(parse_snapshot("[[1], []]").is_err());
        assert!(parse_snapshot("[[1], [[]]]").is_err());
    }

    #[test]
    fn test_non_numeric_values_rejected() {
        assert!(parse_snapshot("[[1], [[NaN, 1.0]]]").is_err());
        assert!(parse_snapshot("not a snapshot").is_err());
        assert!(parse_snapshot("").is_err());
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(strip_trailing_commas("[1, 2, ]"), "[1, 2]");
        assert_eq!(strip_trailing_commas("[[1,],[2 , ]]"), "[[1],[2 ]]");
        assert_eq!(strip_trailing_commas("[1, 2]"), "[1, 2]");
    }

    #[test]
    fn test_value_range_and_cells() {
        let grid = Grid::from_rows(vec![vec![3.0, -1.0], vec![0.5, 7.0]]).unwrap();
        assert_eq!(grid.value_range(), (-1.0, 7.0));
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells[3], (1, 1, 7.0));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn test_read_snapshot_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_3.txt");
        std::fs::write(&path, "[[3], [[1.0, 2.0]").unwrap();

        match read_snapshot(&path) {
            Err(HarnessError::MalformedSnapshot { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected MalformedSnapshot, got {:?}", other),
        }
    }
}
