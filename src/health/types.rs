use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrbitClass {
    Gso,
    Igso,
    Unclassified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SubScoreKind {
    Inclination,
    Maintenance,
    Uniformity,
    Drift,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubScore {
    pub kind: SubScoreKind,
    /// `None` when the inputs for this component are missing.
    pub score: Option<f64>,
    pub weight: f64,
    /// Weight after renormalising over the available components.
    pub effective_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
}

impl SubScore {
    pub fn scored(kind: SubScoreKind, score: f64, weight: f64) -> Self {
        Self {
            kind,
            score: Some(score.clamp(0.0, 100.0)),
            weight,
            effective_weight: 0.0,
            unavailable_reason: None,
        }
    }

    pub fn unavailable(kind: SubScoreKind, weight: f64, reason: impl Into<String>) -> Self {
        Self {
            kind,
            score: None,
            weight,
            effective_weight: 0.0,
            unavailable_reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "finding", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Finding {
    InclinationOutOfTolerance {
        deviation_deg: f64,
        tolerance_deg: f64,
    },
    DriftIncreasing {
        rate: f64,
    },
    UnstableDrift {
        std_deg_per_day: f64,
        tolerance: f64,
    },
    LowMaintenance {
        per_month: f64,
        minimum: f64,
    },
    ExcessiveMaintenance {
        per_month: f64,
        maximum: f64,
    },
    IrregularCadence {
        coefficient_of_variation: f64,
    },
    StableOrbit {
        inclination_std_deg: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthVerdict {
    pub norad_id: u32,
    pub score: Option<f64>,
    pub status: HealthStatus,
    pub orbit_class: OrbitClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maneuvers_per_month: Option<f64>,
    pub sub_scores: Vec<SubScore>,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthWeights {
    pub inclination: f64,
    pub maintenance: f64,
    pub uniformity: f64,
    pub drift: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            inclination: 0.35,
            maintenance: 0.25,
            uniformity: 0.15,
            drift: 0.25,
        }
    }
}

impl HealthWeights {
    pub fn sum(&self) -> f64 {
        self.inclination + self.maintenance + self.uniformity + self.drift
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthParams {
    pub weights: HealthWeights,
    /// Lowest score that is still HEALTHY.
    pub healthy: f64,
    /// Lowest score that is still DEGRADED.
    pub degraded: f64,
    pub inclination_tolerance_deg: f64,
    pub min_maneuvers_per_month: f64,
    pub max_maneuvers_per_month: f64,
    pub uniformity_threshold: f64,
    pub igso_min_inclination_deg: f64,
    /// Inclination scatter below which the orbit is reported stable.
    pub stable_inclination_std_deg: f64,
}

impl Default for HealthParams {
    fn default() -> Self {
        Self {
            weights: HealthWeights::default(),
            healthy: 70.0,
            degraded: 50.0,
            inclination_tolerance_deg: 1.0,
            min_maneuvers_per_month: 1.0,
            max_maneuvers_per_month: 8.0,
            uniformity_threshold: 0.8,
            igso_min_inclination_deg: 10.0,
            stable_inclination_std_deg: 0.1,
        }
    }
}
