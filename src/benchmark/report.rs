// src/benchmark/report.rs

use log::info;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::benchmark::timing::SpeedupTable;
use crate::canvas::{with_canvas, Canvas};
use crate::config::PlotConfig;
use crate::error::{HarnessError, Result};

const SERIES_COLORS: [RGBColor; 8] = [
    RED,
    BLUE,
    GREEN,
    MAGENTA,
    CYAN,
    BLACK,
    RGBColor(255, 165, 0), // Orange
    RGBColor(128, 0, 128), // Purple
];

/// `<output_dir>/<mode>-speedup.png`
pub fn speedup_chart_path(output_dir: &Path, mode: &str) -> PathBuf {
    output_dir.join(format!("{}-speedup.png", mode))
}

/// Draw one speedup line per problem size against the thread-count axis.
///
/// Each call draws on its own canvas, so consecutive modes never draw onto
/// each other's chart.
pub fn plot_speedups(
    thread_counts: &[u32],
    speedups: &SpeedupTable,
    mode: &str,
    output_dir: &Path,
    config: &PlotConfig,
) -> Result<PathBuf> {
    if thread_counts.is_empty() || speedups.is_empty() {
        return Err(HarnessError::InvalidArgument(format!(
            "nothing to plot for mode {}",
            mode
        )));
    }

    let path = speedup_chart_path(output_dir, mode);
    with_canvas(&path, (config.width, config.height), |root| {
        draw_speedup_chart(root, thread_counts, speedups, mode, config)
    })?;

    info!("Speedup chart for {} written to {}", mode, path.display());
    Ok(path)
}

fn draw_speedup_chart(
    root: &Canvas<'_>,
    thread_counts: &[u32],
    speedups: &SpeedupTable,
    mode: &str,
    config: &PlotConfig,
) -> Result<()> {
    let (x_min, x_max) = axis_bounds(thread_counts.iter().map(|&t| t as f64));
    let y_top = speedups
        .entries()
        .map(|(_, _, s)| s)
        .fold(1.0_f64, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(root)
        .caption(config.title_for(mode), ("sans-serif", 30.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0.0..y_top)
        .map_err(HarnessError::plot)?;

    chart
        .configure_mesh()
        .x_desc(&config.xlabel)
        .y_desc(&config.ylabel)
        .draw()
        .map_err(HarnessError::plot)?;

    for (index, (problem_size, row)) in speedups.rows().enumerate() {
        let color = SERIES_COLORS[index % SERIES_COLORS.len()];
        let line_width = config.line_width;
        let points: Vec<(f64, f64)> = thread_counts
            .iter()
            .filter_map(|&threads| row.get(&threads).map(|&s| (threads as f64, s)))
            .collect();

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(line_width)))
            .map_err(HarnessError::plot)?
            .label(format!("{} data points", problem_size))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(line_width))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(HarnessError::plot)?;

    Ok(())
}

/// Padded range over the values; a single value still gets a visible span
fn axis_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}
