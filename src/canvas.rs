// src/canvas.rs

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

use crate::error::{HarnessError, Result};

pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Draw one image file on a fresh white canvas.
///
/// The canvas exists only for the duration of `draw` and is flushed to `path`
/// afterwards, so no drawing state carries over from one image to the next.
pub fn with_canvas<F>(path: &Path, size: (u32, u32), draw: F) -> Result<()>
where
    F: FnOnce(&Canvas<'_>) -> Result<()>,
{
    if size.0 == 0 || size.1 == 0 {
        return Err(HarnessError::InvalidArgument(format!(
            "image size {}x{} has no area",
            size.0, size.1
        )));
    }

    let result = {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        let drawn = root
            .fill(&WHITE)
            .map_err(HarnessError::plot)
            .and_then(|_| draw(&root))
            .and_then(|_| root.present().map_err(HarnessError::plot));
        // the backend flushes whatever was drawn when it drops here
        drawn
    };

    if result.is_err() {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                log::warn!("Could not remove partial image {}: {}", path.display(), e)
            }
            _ => {}
        }
    }
    result
}
