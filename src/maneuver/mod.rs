//! Robust change-point detection on element-set time series.

mod detector;
mod types;
mod window;

pub use detector::{
    detect_maneuvers, maneuver_uniformity, modified_z_score, score_series, ScoredSample,
    MAD_SCALE, SATURATED_Z,
};
pub use types::{
    Cadence, Confidence, Detection, DetectionStatus, DetectorParams, ManeuverEvent, ManeuverKind,
    Uniformity,
};
pub use window::{mad, median, BaselineWindow, SlidingWindow};
