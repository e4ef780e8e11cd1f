use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DopQuality {
    Excellent,
    Good,
    Moderate,
    Poor,
    Unavailable,
}

/// Upper GDOP bounds (exclusive) of each quality class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DopBands {
    pub excellent: f64,
    pub good: f64,
    pub moderate: f64,
}

impl Default for DopBands {
    fn default() -> Self {
        Self {
            excellent: 2.0,
            good: 4.0,
            moderate: 6.0,
        }
    }
}

impl DopBands {
    pub fn classify(&self, gdop: f64) -> DopQuality {
        if gdop < self.excellent {
            DopQuality::Excellent
        } else if gdop < self.good {
            DopQuality::Good
        } else if gdop < self.moderate {
            DopQuality::Moderate
        } else {
            DopQuality::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DopValues {
    pub gdop: f64,
    pub pdop: f64,
    pub hdop: f64,
    pub vdop: f64,
    pub tdop: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DopUnavailable {
    #[error("fewer than four satellites above the elevation mask")]
    TooFewSatellites,
    #[error("singular satellite geometry")]
    SingularGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DopSample {
    pub ground_point: String,
    pub timestamp: DateTime<Utc>,
    pub visible_count: usize,
    pub visible: Vec<u32>,
    pub failed_propagations: usize,
    pub quality: DopQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dop: Option<DopValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<DopUnavailable>,
}

/// Aggregate over one ground point's samples; DOP statistics cover available samples only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub ground_point: String,
    pub samples: usize,
    pub available: usize,
    pub availability: f64,
    pub pdop_min: Option<f64>,
    pub pdop_mean: Option<f64>,
    pub pdop_max: Option<f64>,
    pub gdop_min: Option<f64>,
    pub gdop_mean: Option<f64>,
    pub gdop_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundTrackPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundingBox {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub samples: usize,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub mean_lat: f64,
    pub mean_lon: f64,
}

impl BoundingBox {
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundTrackBoxes {
    pub norad_id: u32,
    pub name: Option<String>,
    pub sample_count: usize,
    pub skipped_samples: usize,
    pub boxes: Vec<BoundingBox>,
}
