// src/benchmark/timer.rs

use log::{debug, warn};
use std::fmt;
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{HarnessError, Result};

const SIZE_PLACEHOLDER: &str = "{size}";
const THREADS_PLACEHOLDER: &str = "{threads}";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A solver invocation with `{size}` / `{threads}` placeholders in its arguments.
///
/// The solver is always spawned directly from an argument list, never through a
/// shell, so sizes and thread counts cannot be reinterpreted as shell syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverCommand {
    pub program: String,
    pub args: Vec<String>,
}

/// A [`SolverCommand`] with every placeholder filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SolverCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        SolverCommand {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace separated template such as
    /// `go run ../simulator/simulator.go {size} {threads}`.
    pub fn parse(template: &str) -> Result<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| HarnessError::InvalidTemplate("empty command".to_string()))?;
        Ok(SolverCommand {
            program,
            args: parts.collect(),
        })
    }

    fn mentions(&self, placeholder: &str) -> bool {
        self.program.contains(placeholder) || self.args.iter().any(|a| a.contains(placeholder))
    }

    pub fn require_sequential(&self) -> Result<()> {
        if !self.mentions(SIZE_PLACEHOLDER) {
            return Err(HarnessError::InvalidTemplate(format!(
                "`{}` does not reference {}",
                self, SIZE_PLACEHOLDER
            )));
        }
        Ok(())
    }

    pub fn require_parallel(&self) -> Result<()> {
        self.require_sequential()?;
        if !self.mentions(THREADS_PLACEHOLDER) {
            return Err(HarnessError::InvalidTemplate(format!(
                "`{}` does not reference {}",
                self, THREADS_PLACEHOLDER
            )));
        }
        Ok(())
    }

    /// Substitute one configuration into the template
    pub fn render(&self, problem_size: u32, thread_count: Option<u32>) -> Result<RenderedCommand> {
        let fill = |part: &str| -> Result<String> {
            let filled = part.replace(SIZE_PLACEHOLDER, &problem_size.to_string());
            match thread_count {
                Some(threads) => Ok(filled.replace(THREADS_PLACEHOLDER, &threads.to_string())),
                None if filled.contains(THREADS_PLACEHOLDER) => Err(HarnessError::InvalidTemplate(
                    format!("`{}` needs a thread count", self),
                )),
                None => Ok(filled),
            }
        };

        Ok(RenderedCommand {
            program: fill(&self.program)?,
            args: self.args.iter().map(|a| fill(a)).collect::<Result<Vec<_>>>()?,
        })
    }
}

impl fmt::Display for SolverCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Source of elapsed-time samples.
///
/// [`ProcessTimer`] is the real implementation; the runner only depends on this
/// trait so repetitions can be scripted in tests.
pub trait Timer {
    /// Run one command to completion and report the seconds it printed
    fn time(&mut self, command: &RenderedCommand) -> Result<f64>;
}

/// Spawns the solver and reads the single number it prints on stdout.
///
/// Without a timeout the calling thread blocks until the solver exits, however
/// long that takes.
#[derive(Debug, Clone, Default)]
pub struct ProcessTimer {
    timeout: Option<Duration>,
}

impl ProcessTimer {
    pub fn new() -> Self {
        ProcessTimer { timeout: None }
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        ProcessTimer { timeout }
    }

    fn spawn_and_wait(&self, command: &RenderedCommand) -> Result<Output> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).stdin(Stdio::null());

        let Some(timeout) = self.timeout else {
            return cmd
                .output()
                .map_err(|e| HarnessError::process(command.to_string(), e.to_string()));
        };

        let mut child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HarnessError::process(command.to_string(), e.to_string()))?;

        // Drain both pipes on their own threads so a chatty solver cannot block on a full pipe
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(HarnessError::process(
                        command.to_string(),
                        format!("lost track of the process: {}", e),
                    ));
                }
            }
            if started.elapsed() >= timeout {
                warn!("Killing `{}` after {:?}", command, timeout);
                // the child may exit between try_wait and kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(HarnessError::process(
                    command.to_string(),
                    format!("timed out after {:?}", timeout),
                ));
            }
            thread::sleep(POLL_INTERVAL);
        };

        Ok(Output {
            status,
            stdout: stdout.map(join_drain).unwrap_or_default(),
            stderr: stderr.map(join_drain).unwrap_or_default(),
        })
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn join_drain(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

impl Timer for ProcessTimer {
    fn time(&mut self, command: &RenderedCommand) -> Result<f64> {
        debug!("Spawning `{}`", command);
        let output = self.spawn_and_wait(command)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HarnessError::process(
                command.to_string(),
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        parse_elapsed(&output.stdout)
            .map_err(|reason| HarnessError::process(command.to_string(), reason))
    }
}

/// Decode the solver's stdout as one non-negative number of seconds
pub fn parse_elapsed(stdout: &[u8]) -> std::result::Result<f64, String> {
    let text = std::str::from_utf8(stdout).map_err(|e| format!("stdout is not UTF-8: {}", e))?;
    let text = text.trim();

    let seconds: f64 = text
        .parse()
        .map_err(|_| format!("expected a single number of seconds, got {:?}", text))?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("elapsed time must be a non-negative number, got {}", seconds));
    }
    Ok(seconds)
}
