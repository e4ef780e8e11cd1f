use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MU_KM3_S2: f64 = 398_600.4418;
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;

/// A raw two- or three-line element set as handed over by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawElementSet {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
}

impl RawElementSet {
    pub fn new(name: Option<String>, line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Self {
            name,
            line1: line1.into(),
            line2: line2.into(),
        }
    }
}

/// One parsed element set. Immutable once built by the parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalState {
    pub norad_id: u32,
    pub name: Option<String>,
    pub epoch: DateTime<Utc>,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub eccentricity: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    /// Revolutions per day.
    pub mean_motion: f64,
    /// First derivative of mean motion over two, rev/day².
    pub mean_motion_dot: f64,
    /// B* drag term, 1/earth radii.
    pub drag_term: f64,
    pub element_set_number: u32,
    #[serde(skip)]
    pub(crate) line1: String,
    #[serde(skip)]
    pub(crate) line2: String,
}

impl OrbitalState {
    pub fn lines(&self) -> (&str, &str) {
        (&self.line1, &self.line2)
    }

    /// Semi-major axis from Kepler's third law.
    pub fn semi_major_axis_km(&self) -> f64 {
        let n_rad_s = self.mean_motion * std::f64::consts::TAU / 86_400.0;
        (MU_KM3_S2 / (n_rad_s * n_rad_s)).cbrt()
    }

    pub fn altitude_km(&self) -> f64 {
        self.semi_major_axis_km() - EARTH_EQUATORIAL_RADIUS_KM
    }
}
