// src/visualize/sequence.rs

use glob::Pattern;
use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, Frame};
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::VisualizationConfig;
use crate::error::{HarnessError, Result};

/// GIF quantizer speed (1 = best quality, 30 = fastest)
const GIF_SPEED: i32 = 10;

/// Rendered intermediate frames, each tagged with the iteration it shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameManifest {
    frames: Vec<(u64, PathBuf)>,
}

impl FrameManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, iteration: u64, path: PathBuf) {
        self.frames.push((iteration, path));
    }

    /// Order by iteration, ascending
    pub fn sort(&mut self) {
        self.frames.sort_by_key(|(iteration, _)| *iteration);
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &Path)> + '_ {
        self.frames.iter().map(|(iteration, path)| (*iteration, path.as_path()))
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.frames.iter().map(|(_, path)| path.as_path()).collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Rebuild a manifest from frame file names in `dir`.
    ///
    /// Picks up `<frame_prefix>*.<image_extension>`, skips the reserved boundary
    /// frames, and orders numerically so `x_2` comes before `x_10`.
    pub fn discover(dir: &Path, config: &VisualizationConfig) -> Result<Self> {
        let dir_str = dir.to_str().ok_or_else(|| {
            HarnessError::InvalidArgument(format!("{} is not valid UTF-8", dir.display()))
        })?;
        let pattern = format!(
            "{}/{}*.{}",
            Pattern::escape(dir_str),
            Pattern::escape(&config.frame_prefix),
            Pattern::escape(&config.image_extension)
        );
        let reserved = config.reserved_frame_names();

        let mut manifest = FrameManifest::new();
        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|e| HarnessError::Io(e.into()))?;
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if reserved.iter().any(|r| r == file_name) {
                continue;
            }
            let iteration = frame_index(file_name, &config.frame_prefix, &config.image_extension)?;
            manifest.push(iteration, path);
        }

        manifest.sort();
        debug!("Discovered {} frames in {}", manifest.len(), dir.display());
        Ok(manifest)
    }
}

/// Iteration index encoded in a frame name such as `x_12.png`
pub fn frame_index(file_name: &str, prefix: &str, extension: &str) -> Result<u64> {
    let suffix = format!(".{}", extension);
    file_name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(&suffix))
        .and_then(|digits| digits.parse::<u64>().ok())
        .ok_or_else(|| HarnessError::FilenameFormat {
            file_name: file_name.to_string(),
        })
}

/// Encode the manifest's frames, in iteration order, as a looping GIF in `dir`.
///
/// Frames whose size differs from the first one are scaled to match it.
pub fn assemble_animation(
    manifest: &FrameManifest,
    dir: &Path,
    config: &VisualizationConfig,
) -> Result<PathBuf> {
    if manifest.is_empty() {
        return Err(HarnessError::EmptySequence {
            directory: dir.to_path_buf(),
        });
    }

    let mut ordered = manifest.clone();
    ordered.sort();

    let movie_path = dir.join(&config.movie_name);
    let writer = BufWriter::new(File::create(&movie_path)?);
    let mut encoder = GifEncoder::new_with_speed(writer, GIF_SPEED);
    encoder.set_repeat(Repeat::Infinite)?;

    let delay = Delay::from_numer_denom_ms(config.frame_delay_ms, 1);
    let mut size = None;

    for (iteration, path) in ordered.iter() {
        let mut buffer = image::open(path)?.to_rgba8();
        let (width, height) = *size.get_or_insert(buffer.dimensions());
        if buffer.dimensions() != (width, height) {
            debug!("Scaling frame {} to {}x{}", iteration, width, height);
            buffer = imageops::resize(&buffer, width, height, FilterType::Triangle);
        }
        encoder.encode_frame(Frame::from_parts(buffer, 0, 0, delay))?;
    }

    info!("Assembled {} frames into {}", ordered.len(), movie_path.display());
    Ok(movie_path)
}

/// Discover frames by file name and assemble them
pub fn assemble_directory(dir: &Path, config: &VisualizationConfig) -> Result<PathBuf> {
    let manifest = FrameManifest::discover(dir, config)?;
    assemble_animation(&manifest, dir, config)
}
