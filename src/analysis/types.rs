use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::Display;
use uuid::Uuid;

use crate::dop::{CoverageSummary, DopSample, GroundTrackBoxes};
use crate::drift::{DriftRecord, DriftSummary};
use crate::elements::SkippedRecord;
use crate::health::{HealthVerdict, OrbitClass};
use crate::maneuver::{Detection, ManeuverEvent, Uniformity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Ok,
    DataInsufficient,
    FetchFailed,
}

/// Everything derived for one satellite in a run.
#[derive(Debug, Clone, Serialize)]
pub struct SatelliteReport {
    pub norad_id: u32,
    pub name: Option<String>,
    pub active: bool,
    pub status: AnalysisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub element_sets: usize,
    pub skipped: Vec<SkippedRecord>,
    /// Records outside the mean-motion plausibility band.
    pub rejected: usize,
    pub orbit_class: OrbitClass,
    pub drift: Vec<DriftRecord>,
    pub drift_summary: Option<DriftSummary>,
    pub detections: Vec<Detection>,
    /// East-west and north-south events together, epoch ascending.
    pub maneuvers: Vec<ManeuverEvent>,
    pub uniformity: Option<Uniformity>,
    pub health: Option<HealthVerdict>,
}

impl SatelliteReport {
    pub(crate) fn empty(norad_id: u32, name: Option<String>, active: bool, status: AnalysisStatus) -> Self {
        Self {
            norad_id,
            name,
            active,
            status,
            error: None,
            element_sets: 0,
            skipped: Vec::new(),
            rejected: 0,
            orbit_class: OrbitClass::Unclassified,
            drift: Vec::new(),
            drift_summary: None,
            detections: Vec::new(),
            maneuvers: Vec::new(),
            uniformity: None,
            health: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DopReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub step_seconds: i64,
    pub elevation_mask_deg: f64,
    /// Catalog ids that took part in the DOP geometry.
    pub satellites: Vec<u32>,
    pub coverage: Vec<CoverageSummary>,
    pub samples: Vec<DopSample>,
    pub ground_tracks: Vec<GroundTrackBoxes>,
}

/// Output envelope of one CLI run.
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Report<T> {
    pub fn new(body: T) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            body,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub satellites: Vec<SatelliteReport>,
}
