// src/visualize/mod.rs
//
// Snapshot dumps → heat-map frames → looping animation → cleanup.

pub mod cleaner;
pub mod frame;
pub mod pipeline;
pub mod sequence;
pub mod snapshot;

pub use cleaner::{clean_output, CleanupReport};
pub use frame::{frame_path, render_frame};
pub use pipeline::{render_directory, run_visualization, RenderedFrames, VisualizationReport};
pub use sequence::{assemble_animation, assemble_directory, FrameManifest};
pub use snapshot::{parse_snapshot, read_snapshot, Grid, Snapshot};
