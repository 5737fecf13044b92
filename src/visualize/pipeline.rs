// src/visualize/pipeline.rs

use glob::Pattern;
use log::info;
use std::path::{Path, PathBuf};

use crate::config::VisualizationConfig;
use crate::error::{HarnessError, Result};
use crate::visualize::cleaner::{clean_output, CleanupReport};
use crate::visualize::frame::render_frame;
use crate::visualize::sequence::{assemble_animation, FrameManifest};
use crate::visualize::snapshot::read_snapshot;

/// Frames produced by one rendering pass
#[derive(Debug, Clone, Default)]
pub struct RenderedFrames {
    /// Intermediate frames, ordered by the iteration read from each snapshot
    pub manifest: FrameManifest,
    /// Initial/target state images that survive cleanup
    pub boundary: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct VisualizationReport {
    pub frames_rendered: usize,
    pub boundary: Vec<PathBuf>,
    pub movie: PathBuf,
    /// `None` when cleanup is disabled
    pub cleanup: Option<CleanupReport>,
}

/// Snapshot dumps in `dir`, sorted by path
pub fn snapshot_files(dir: &Path, config: &VisualizationConfig) -> Result<Vec<PathBuf>> {
    let dir_str = dir.to_str().ok_or_else(|| {
        HarnessError::InvalidArgument(format!("{} is not valid UTF-8", dir.display()))
    })?;
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(dir_str),
        Pattern::escape(&config.snapshot_extension)
    );

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|e| HarnessError::Io(e.into()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Render every snapshot in `dir` to a frame beside it.
///
/// Stops at the first snapshot that fails to parse; frames rendered before it
/// stay on disk.
pub fn render_directory(dir: &Path, config: &VisualizationConfig) -> Result<RenderedFrames> {
    let mut rendered = RenderedFrames::default();

    for source in snapshot_files(dir, config)? {
        let snapshot = read_snapshot(&source)?;
        let frame = render_frame(&snapshot, &source, config)?;

        let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if config.reserved_stems.iter().any(|r| r == stem) {
            rendered.boundary.push(frame);
        } else {
            rendered.manifest.push(snapshot.iteration, frame);
        }
    }

    rendered.manifest.sort();
    info!(
        "Rendered {} frames and {} boundary images in {}",
        rendered.manifest.len(),
        rendered.boundary.len(),
        dir.display()
    );
    Ok(rendered)
}

/// Render, assemble, then clean `dir`.
///
/// Cleanup only runs once the animation has been written; any earlier failure
/// leaves every snapshot and frame in place.
pub fn run_visualization(dir: &Path, config: &VisualizationConfig) -> Result<VisualizationReport> {
    let rendered = render_directory(dir, config)?;
    let movie = assemble_animation(&rendered.manifest, dir, config)?;

    let cleanup = if config.cleanup {
        Some(clean_output(dir, config)?)
    } else {
        None
    };

    Ok(VisualizationReport {
        frames_rendered: rendered.manifest.len(),
        boundary: rendered.boundary,
        movie,
        cleanup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn small_config() -> VisualizationConfig {
        VisualizationConfig {
            frame_width: 320,
            frame_height: 240,
            ..VisualizationConfig::default()
        }
    }

    #[test]
    fn test_snapshot_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["x_2.txt", "b.txt", "x_10.txt", "notes.md"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let files = snapshot_files(dir.path(), &small_config()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["b.txt", "x_10.txt", "x_2.txt"]);
    }

    #[test]
    fn test_render_directory_uses_snapshot_iterations() {
        let dir = tempfile::tempdir().unwrap();
        // file name and content disagree; content wins
        fs::write(dir.path().join("x_9.txt"), "[[1], [[0.0, 1.0], [1.0, 0.0]]]").unwrap();
        fs::write(dir.path().join("x_1.txt"), "[[7], [[0.0, 1.0], [1.0, 0.0]]]").unwrap();
        fs::write(dir.path().join("b.txt"), "[0], [[1.0, 1.0, ], [1.0, 1.0, ]]").unwrap();

        let rendered = render_directory(dir.path(), &small_config()).unwrap();
        let order: Vec<_> = rendered.manifest.iter().map(|(i, p)| (i, p.to_path_buf())).collect();
        assert_eq!(
            order,
            vec![(1, dir.path().join("x_9.png")), (7, dir.path().join("x_1.png"))]
        );
        assert_eq!(rendered.boundary, vec![dir.path().join("b.png")]);
    }

    #[test]
    fn test_malformed_snapshot_aborts_without_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x_1.txt"), "[[1], [[0.0, 1.0]]]").unwrap();
        fs::write(dir.path().join("x_2.txt"), "[[2], [[0.0, 1.0]]").unwrap();

        let result = run_visualization(dir.path(), &small_config());
        assert!(matches!(result, Err(HarnessError::MalformedSnapshot { .. })));
        assert!(dir.path().join("x_1.txt").exists());
        assert!(dir.path().join("x_2.txt").exists());
        assert!(!dir.path().join("x_2.png").exists());
        assert!(!dir.path().join("movie.gif").exists());
    }
}
