// src/lib.rs

pub mod benchmark;
pub mod canvas;
pub mod config;
pub mod error;
pub mod visualize;

pub use error::{HarnessError, Result};
