use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftDirection {
    Eastward,
    Westward,
    Stationary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftSeverity {
    Nominal,
    Watch,
    Alert,
}

/// Drift thresholds in deg/day for one orbit class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftThresholds {
    /// Band around zero that is always nominal.
    pub tolerance: f64,
    pub watch: f64,
    pub alert: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriftRecord {
    pub epoch: DateTime<Utc>,
    pub rate_deg_per_day: f64,
    pub direction: DriftDirection,
    pub severity: DriftSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Steady,
}

/// Change of drift magnitude over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftTrend {
    Trend {
        direction: TrendDirection,
        /// Slope of |drift| in deg/day per day.
        rate: f64,
        samples: usize,
    },
    InsufficientData {
        samples: usize,
    },
}

impl DriftTrend {
    pub fn direction(&self) -> Option<TrendDirection> {
        match self {
            DriftTrend::Trend { direction, .. } => Some(*direction),
            DriftTrend::InsufficientData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DriftSummary {
    pub mean_deg_per_day: f64,
    pub std_deg_per_day: f64,
    pub current_deg_per_day: f64,
    pub severity: DriftSeverity,
    pub direction: DriftDirection,
    pub trend: DriftTrend,
}
