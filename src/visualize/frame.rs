// src/visualize/frame.rs

use log::debug;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::canvas::{with_canvas, Canvas};
use crate::config::VisualizationConfig;
use crate::error::{HarnessError, Result};
use crate::visualize::snapshot::{Grid, Snapshot};

const COLORBAR_WIDTH: u32 = 110;
const COLORBAR_STEPS: usize = 128;

/// Frame for `output/x_7.txt` is `output/x_7.png`
pub fn frame_path(source: &Path, image_extension: &str) -> PathBuf {
    source.with_extension(image_extension)
}

/// Blue (low) through green to red (high); `t` is clamped to `[0, 1]`
pub fn heat_color(t: f64) -> HSLColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    HSLColor((1.0 - t) * 240.0 / 360.0, 1.0, 0.5)
}

/// Render `snapshot` as a heat map with a vertical colorbar next to `source`
pub fn render_frame(
    snapshot: &Snapshot,
    source: &Path,
    config: &VisualizationConfig,
) -> Result<PathBuf> {
    if config.frame_width < COLORBAR_WIDTH * 2 {
        return Err(HarnessError::InvalidArgument(format!(
            "frame_width {} leaves no room beside the colorbar",
            config.frame_width
        )));
    }

    let path = frame_path(source, &config.image_extension);
    with_canvas(&path, (config.frame_width, config.frame_height), |root| {
        let (heat_area, bar_area) = root.split_horizontally((config.frame_width - COLORBAR_WIDTH) as i32);
        let (lo, hi) = value_span(&snapshot.grid);
        draw_heat_map(&heat_area, &snapshot.grid, lo, hi, &config.frame_title)?;
        draw_colorbar(&bar_area, lo, hi)
    })?;

    debug!(
        "Rendered iteration {} ({}x{}) to {}",
        snapshot.iteration,
        snapshot.grid.rows(),
        snapshot.grid.cols(),
        path.display()
    );
    Ok(path)
}

/// Value range used for coloring; a constant grid gets a unit span
fn value_span(grid: &Grid) -> (f64, f64) {
    let (lo, hi) = grid.value_range();
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if hi > lo {
        (lo, hi)
    } else {
        (lo, lo + 1.0)
    }
}

fn draw_heat_map(area: &Canvas<'_>, grid: &Grid, lo: f64, hi: f64, title: &str) -> Result<()> {
    let rows = grid.rows() as i32;
    let cols = grid.cols() as i32;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 28.0).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0..cols, 0..rows)
        .map_err(HarnessError::plot)?;

    // row 0 is drawn at the top, so axis labels count downwards
    let row_label = move |y: &i32| (rows - *y).to_string();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("X")
        .y_desc("Y")
        .y_label_formatter(&row_label)
        .draw()
        .map_err(HarnessError::plot)?;

    chart
        .draw_series(grid.cells().map(|(r, c, value)| {
            let (x, top) = (c as i32, rows - r as i32);
            Rectangle::new([(x, top - 1), (x + 1, top)], heat_color((value - lo) / (hi - lo)).filled())
        }))
        .map_err(HarnessError::plot)?;

    Ok(())
}

fn draw_colorbar(area: &Canvas<'_>, lo: f64, hi: f64) -> Result<()> {
    let mut bar = ChartBuilder::on(area)
        .margin_top(60)
        .margin_bottom(45)
        .margin_right(10)
        .right_y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(HarnessError::plot)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(6)
        .draw()
        .map_err(HarnessError::plot)?;

    let step = (hi - lo) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let bottom = lo + step * i as f64;
        let t = i as f64 / (COLORBAR_STEPS - 1) as f64;
        Rectangle::new([(0.0, bottom), (1.0, bottom + step)], heat_color(t).filled())
    }))
    .map_err(HarnessError::plot)?;

    Ok(())
}
