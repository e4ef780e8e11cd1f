use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::dop::DopBands;
use crate::drift::DriftThresholds;
use crate::elements::MeanMotionBounds;
use crate::health::{HealthParams, OrbitClass};
use crate::maneuver::{DetectorParams, ManeuverKind};
use crate::propagate::GroundPoint;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Analysis configuration. Every section has defaults, so `{}` is a complete NavIC setup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_satellites")]
    pub satellites: Vec<SatelliteEntry>,
    #[serde(default = "default_ground_points")]
    pub ground_points: Vec<GroundPointConfig>,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub drift: DriftConfig,
    #[serde(default)]
    pub maneuver: ManeuverConfig,
    #[serde(default)]
    pub dop: DopConfig,
    #[serde(default)]
    pub health: HealthParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SatelliteEntry {
    pub name: String,
    pub norad_id: u32,
    #[serde(default)]
    pub target_longitude_deg: Option<f64>,
    #[serde(default)]
    pub target_inclination_deg: Option<f64>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroundPointConfig {
    pub name: String,
    /// `"lat, lon"` in degrees.
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    /// Defaults to the latest epoch across the loaded histories.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default = "default_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    #[serde(default = "default_step", deserialize_with = "deserialize_duration")]
    pub step: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_mean_motion_min")]
    pub mean_motion_min: f64,
    #[serde(default = "default_mean_motion_max")]
    pub mean_motion_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriftConfig {
    #[serde(default = "default_gso_thresholds")]
    pub gso: DriftThresholds,
    #[serde(default = "default_igso_thresholds")]
    pub igso: DriftThresholds,
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
    #[serde(default = "default_trend_tolerance")]
    pub trend_tolerance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManeuverConfig {
    #[serde(default = "default_z_threshold")]
    pub z_threshold: f64,
    #[serde(default)]
    pub window: Option<usize>,
    #[serde(default = "default_min_window")]
    pub min_window: usize,
    #[serde(default = "default_max_window")]
    pub max_window: usize,
    #[serde(default = "default_min_run_length")]
    pub min_run_length: usize,
    #[serde(default = "default_merge_gap", deserialize_with = "deserialize_duration")]
    pub merge_gap: Duration,
    /// rev/day
    #[serde(default = "default_mean_motion_deviation")]
    pub mean_motion_min_deviation: f64,
    /// deg
    #[serde(default = "default_inclination_deviation")]
    pub inclination_min_deviation: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DopConfig {
    #[serde(default = "default_elevation_mask")]
    pub elevation_mask_deg: f64,
    #[serde(default)]
    pub bands: DopBands,
}

fn default_true() -> bool {
    true
}

fn default_satellites() -> Vec<SatelliteEntry> {
    let entry = |name: &str, norad_id, lon, inc, active| SatelliteEntry {
        name: name.to_string(),
        norad_id,
        target_longitude_deg: Some(lon),
        target_inclination_deg: Some(inc),
        active,
    };
    vec![
        entry("IRNSS-1B", 39635, 55.0, 29.0, false),
        entry("IRNSS-1C", 40269, 83.0, 5.0, false),
        entry("IRNSS-1D", 40547, 111.75, 30.0, false),
        entry("IRNSS-1E", 41241, 111.75, 29.0, true),
        entry("IRNSS-1F", 41384, 32.5, 5.0, true),
        entry("IRNSS-1I", 43286, 55.0, 29.0, true),
        entry("NVS-01", 56759, 129.5, 5.0, true),
    ]
}

fn default_ground_points() -> Vec<GroundPointConfig> {
    let point = |name: &str, coordinates: &str| GroundPointConfig {
        name: name.to_string(),
        coordinates: coordinates.to_string(),
        altitude_m: 0.0,
    };
    vec![
        point("Siachen", "35.5, 77.0"),
        point("Indira Point", "6.75, 93.85"),
        point("Kibithu", "28.0, 97.0"),
        point("Guhar Moti", "23.7, 68.1"),
        point("Delhi", "28.7, 77.1"),
    ]
}

fn default_duration() -> Duration {
    Duration::hours(36)
}

fn default_step() -> Duration {
    Duration::minutes(15)
}

fn default_mean_motion_min() -> f64 {
    0.9
}

fn default_mean_motion_max() -> f64 {
    1.1
}

fn default_gso_thresholds() -> DriftThresholds {
    DriftThresholds {
        tolerance: 0.05,
        watch: 0.10,
        alert: 0.25,
    }
}

fn default_igso_thresholds() -> DriftThresholds {
    DriftThresholds {
        tolerance: 2.0,
        watch: 2.0,
        alert: 4.0,
    }
}

fn default_trend_window() -> usize {
    7
}

fn default_trend_tolerance() -> f64 {
    0.001
}

fn default_z_threshold() -> f64 {
    3.5
}

fn default_min_window() -> usize {
    5
}

fn default_max_window() -> usize {
    31
}

fn default_min_run_length() -> usize {
    2
}

fn default_merge_gap() -> Duration {
    Duration::days(3)
}

fn default_mean_motion_deviation() -> f64 {
    1.5e-5
}

fn default_inclination_deviation() -> f64 {
    0.01
}

fn default_elevation_mask() -> f64 {
    5.0
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: None,
            duration: default_duration(),
            step: default_step(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            mean_motion_min: default_mean_motion_min(),
            mean_motion_max: default_mean_motion_max(),
        }
    }
}

impl HistoryConfig {
    pub fn bounds(&self) -> MeanMotionBounds {
        MeanMotionBounds {
            min: self.mean_motion_min,
            max: self.mean_motion_max,
        }
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            gso: default_gso_thresholds(),
            igso: default_igso_thresholds(),
            trend_window: default_trend_window(),
            trend_tolerance: default_trend_tolerance(),
        }
    }
}

impl DriftConfig {
    /// Unclassified orbits fall back to the GSO table.
    pub fn thresholds(&self, class: OrbitClass) -> &DriftThresholds {
        match class {
            OrbitClass::Igso => &self.igso,
            OrbitClass::Gso | OrbitClass::Unclassified => &self.gso,
        }
    }
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self {
            z_threshold: default_z_threshold(),
            window: None,
            min_window: default_min_window(),
            max_window: default_max_window(),
            min_run_length: default_min_run_length(),
            merge_gap: default_merge_gap(),
            mean_motion_min_deviation: default_mean_motion_deviation(),
            inclination_min_deviation: default_inclination_deviation(),
        }
    }
}

impl ManeuverConfig {
    pub fn params(&self, kind: ManeuverKind) -> DetectorParams {
        DetectorParams {
            z_threshold: self.z_threshold,
            window: self.window,
            min_window: self.min_window,
            max_window: self.max_window,
            min_run_length: self.min_run_length,
            merge_gap: self.merge_gap,
            min_deviation: match kind {
                ManeuverKind::EastWest => self.mean_motion_min_deviation,
                ManeuverKind::NorthSouth => self.inclination_min_deviation,
            },
        }
    }
}

impl Default for DopConfig {
    fn default() -> Self {
        Self {
            elevation_mask_deg: default_elevation_mask(),
            bands: DopBands::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            satellites: default_satellites(),
            ground_points: default_ground_points(),
            window: WindowConfig::default(),
            history: HistoryConfig::default(),
            drift: DriftConfig::default(),
            maneuver: ManeuverConfig::default(),
            dop: DopConfig::default(),
            health: HealthParams::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn satellite(&self, norad_id: u32) -> Option<&SatelliteEntry> {
        self.satellites.iter().find(|s| s.norad_id == norad_id)
    }

    pub fn active_ids(&self) -> HashSet<u32> {
        self.satellites
            .iter()
            .filter(|s| s.active)
            .map(|s| s.norad_id)
            .collect()
    }

    pub fn ground_points(&self) -> Result<Vec<GroundPoint>, ConfigError> {
        self.ground_points
            .iter()
            .map(|p| {
                GroundPoint::from_coordinates(&p.name, &p.coordinates, Some(p.altitude_m))
                    .ok_or_else(|| {
                        ConfigError::Invalid(format!(
                            "ground point {}: cannot parse coordinates {:?}",
                            p.name, p.coordinates
                        ))
                    })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        let mut seen = HashSet::new();
        for sat in &self.satellites {
            if !seen.insert(sat.norad_id) {
                return invalid(format!("satellite {} listed twice", sat.norad_id));
            }
        }

        for point in self.ground_points()? {
            if !(-90.0..=90.0).contains(&point.latitude_deg)
                || !(-180.0..=180.0).contains(&point.longitude_deg)
            {
                return invalid(format!("ground point {} outside valid range", point.name));
            }
        }

        if self.window.step <= Duration::zero() {
            return invalid("window step must be positive".into());
        }
        if self.window.duration <= Duration::zero() {
            return invalid("window duration must be positive".into());
        }

        if self.history.mean_motion_min >= self.history.mean_motion_max {
            return invalid("history mean_motion_min must be below mean_motion_max".into());
        }

        for (label, t) in [("gso", &self.drift.gso), ("igso", &self.drift.igso)] {
            if t.tolerance <= 0.0 || t.watch < t.tolerance || t.alert < t.watch {
                return invalid(format!(
                    "drift {} thresholds must satisfy 0 < tolerance <= watch <= alert",
                    label
                ));
            }
        }
        if self.drift.trend_window < crate::drift::MIN_TREND_SAMPLES {
            return invalid(format!(
                "drift trend_window must be at least {}",
                crate::drift::MIN_TREND_SAMPLES
            ));
        }
        if self.drift.trend_tolerance < 0.0 {
            return invalid("drift trend_tolerance must not be negative".into());
        }

        let m = &self.maneuver;
        if m.z_threshold <= 0.0 {
            return invalid("maneuver z_threshold must be positive".into());
        }
        if m.min_window == 0 || m.min_window > m.max_window {
            return invalid("maneuver windows must satisfy 1 <= min_window <= max_window".into());
        }
        if m.window == Some(0) {
            return invalid("maneuver window must be positive".into());
        }
        if m.min_run_length == 0 {
            return invalid("maneuver min_run_length must be positive".into());
        }
        if m.merge_gap < Duration::zero() {
            return invalid("maneuver merge_gap must not be negative".into());
        }
        if m.mean_motion_min_deviation < 0.0 || m.inclination_min_deviation < 0.0 {
            return invalid("maneuver minimum deviations must not be negative".into());
        }

        if !(0.0..90.0).contains(&self.dop.elevation_mask_deg) {
            return invalid("dop elevation_mask_deg must be in [0, 90)".into());
        }
        let b = &self.dop.bands;
        if !(0.0 < b.excellent && b.excellent <= b.good && b.good <= b.moderate) {
            return invalid("dop bands must satisfy 0 < excellent <= good <= moderate".into());
        }

        let h = &self.health;
        if (h.weights.sum() - 1.0).abs() > 1e-6 {
            return invalid(format!("health weights sum to {}, not 1.0", h.weights.sum()));
        }
        let w = &h.weights;
        if [w.inclination, w.maintenance, w.uniformity, w.drift]
            .iter()
            .any(|v| *v < 0.0)
        {
            return invalid("health weights must not be negative".into());
        }
        if !(0.0 <= h.degraded && h.degraded <= h.healthy && h.healthy <= 100.0) {
            return invalid("health thresholds must satisfy 0 <= degraded <= healthy <= 100".into());
        }
        if h.inclination_tolerance_deg <= 0.0
            || h.uniformity_threshold <= 0.0
            || h.stable_inclination_std_deg <= 0.0
        {
            return invalid("health tolerances must be positive".into());
        }
        if h.min_maneuvers_per_month <= 0.0 || h.min_maneuvers_per_month > h.max_maneuvers_per_month
        {
            return invalid(
                "health maneuver rates must satisfy 0 < min_maneuvers_per_month <= max".into(),
            );
        }

        Ok(())
    }
}
