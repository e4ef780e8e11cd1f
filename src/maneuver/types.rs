use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use strum_macros::Display;

/// Which station-keeping axis a series tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ManeuverKind {
    /// Mean-motion steps (longitude keeping).
    EastWest,
    /// Inclination steps.
    NorthSouth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManeuverEvent {
    pub epoch: DateTime<Utc>,
    pub kind: ManeuverKind,
    /// Modified z-score of the peak sample, saturated at ±1000.
    pub z_score: f64,
    /// Peak sample minus its rolling median, in series units.
    pub deviation: f64,
    /// Flagged samples merged into this event.
    pub run_length: usize,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionStatus {
    Ok,
    DataInsufficient,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub kind: ManeuverKind,
    pub status: DetectionStatus,
    pub samples: usize,
    pub window: usize,
    pub events: Vec<ManeuverEvent>,
}

/// Parameters for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorParams {
    pub z_threshold: f64,
    /// Fixed window size; `None` scales with series length.
    pub window: Option<usize>,
    pub min_window: usize,
    pub max_window: usize,
    pub min_run_length: usize,
    pub merge_gap: Duration,
    /// Smallest |value - median| that can count as a maneuver, series units.
    pub min_deviation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Cadence {
    Uniform,
    Irregular,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uniformity {
    pub coefficient_of_variation: f64,
    pub mean_gap_days: f64,
    pub cadence: Cadence,
}
