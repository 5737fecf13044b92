// src/benchmark/system_info.rs

use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Machine and source-tree state a set of timings was taken on.
///
/// Speedups only compare meaningfully between runs on the same host, so this is
/// stamped into every saved [`BenchmarkSuite`](crate::benchmark::BenchmarkSuite).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub os: String,
    pub cpu_model: String,
    pub physical_cores: usize,
    pub logical_cores: usize,
    pub total_memory_mb: u64,
    pub git: GitState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitState {
    pub commit: String,
    pub branch: String,
    pub dirty: bool,
}

impl SystemInfo {
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();

        let unknown = || "unknown".to_string();

        SystemInfo {
            hostname: System::host_name().unwrap_or_else(unknown),
            os: format!(
                "{} {}",
                System::name().unwrap_or_else(unknown),
                System::os_version().unwrap_or_default()
            )
            .trim()
            .to_string(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .unwrap_or_else(unknown),
            physical_cores: num_cpus::get_physical(),
            logical_cores: num_cpus::get(),
            total_memory_mb: sys.total_memory() / 1024 / 1024,
            git: GitState::discover("."),
        }
    }

    pub fn to_string_pretty(&self) -> String {
        format!(
            r#"System Information:
  Hostname:     {}
  OS:           {}
  CPU:          {} ({} cores, {} threads)
  Memory:       {} MB
  Git:          {} ({}){}
"#,
            self.hostname,
            self.os,
            self.cpu_model,
            self.physical_cores,
            self.logical_cores,
            self.total_memory_mb,
            self.git.short_commit(),
            self.git.branch,
            if self.git.dirty { " [dirty]" } else { "" },
        )
    }
}

impl GitState {
    /// Read HEAD of the repository containing `path`, or `unknown` outside one
    pub fn discover(path: &str) -> Self {
        let Ok(repo) = git2::Repository::discover(path) else {
            return GitState {
                commit: "unknown".to_string(),
                branch: "unknown".to_string(),
                dirty: false,
            };
        };

        let head = repo.head().ok();
        let commit = head
            .as_ref()
            .and_then(|h| h.peel_to_commit().ok())
            .map(|c| c.id().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let branch = head
            .as_ref()
            .and_then(|h| h.shorthand())
            .map(str::to_string)
            .unwrap_or_else(|| "unknown".to_string());
        let dirty = repo
            .statuses(None)
            .map(|statuses| !statuses.is_empty())
            .unwrap_or(false);

        GitState { commit, branch, dirty }
    }

    pub fn short_commit(&self) -> String {
        self.commit.chars().take(8).collect()
    }
}
