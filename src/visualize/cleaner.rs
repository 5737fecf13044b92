// src/visualize/cleaner.rs

use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::VisualizationConfig;
use crate::error::Result;

/// What a cleanup pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub snapshots_removed: usize,
    pub frames_removed: usize,
}

/// Delete every snapshot dump and every frame image in `dir` except the
/// reserved boundary frames.
///
/// Only call this after the animation has been written. Running it again on a
/// cleaned directory removes nothing and succeeds.
pub fn clean_output(dir: &Path, config: &VisualizationConfig) -> Result<CleanupReport> {
    let reserved = config.reserved_frame_names();
    let mut report = CleanupReport::default();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let file_name = entry.file_name().to_string_lossy().into_owned();

        if extension == config.snapshot_extension {
            if remove(&path)? {
                report.snapshots_removed += 1;
            }
        } else if extension == config.image_extension && !reserved.contains(&file_name) {
            if remove(&path)? {
                report.frames_removed += 1;
            }
        }
    }

    info!(
        "Cleaned {}: {} snapshots and {} frames removed",
        dir.display(),
        report.snapshots_removed,
        report.frames_removed
    );
    Ok(report)
}

/// Remove one file; a file that is already gone counts as not removed
fn remove(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
