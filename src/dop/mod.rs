//! Positioning geometry over ground points, plus ground-track extents.

mod bbox;
mod engine;
mod geometry;
mod grid;
mod types;

pub use bbox::{bounding_boxes, ground_track, ground_track_boxes};
pub use engine::{summarize_coverage, DopEngine};
pub use geometry::{compute_dop, design_row, normal_matrix, MIN_SATELLITES};
pub use grid::{GridError, TimeGrid};
pub use types::{
    BoundingBox, CoverageSummary, DopBands, DopQuality, DopSample, DopUnavailable, DopValues,
    GroundTrackBoxes, GroundTrackPoint,
};
