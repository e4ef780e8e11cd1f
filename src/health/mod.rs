//! Fuses drift, maneuver cadence and inclination control into a single verdict.

mod scores;
mod types;

pub use scores::{
    classify_orbit, combine, drift_score, drift_stability_limit, inclination_score,
    maintenance_score, maneuvers_per_month, status, uniformity_score,
};
pub use types::{
    Finding, HealthParams, HealthStatus, HealthVerdict, HealthWeights, OrbitClass, SubScore,
    SubScoreKind,
};

use crate::drift::{DriftSummary, DriftThresholds, DriftTrend, TrendDirection};
use crate::elements::SatelliteHistory;
use crate::maneuver::{maneuver_uniformity, Cadence, Detection, DetectionStatus};

/// Everything the scorer looks at for one satellite.
pub struct HealthInputs<'a> {
    pub history: &'a SatelliteHistory,
    pub target_inclination_deg: Option<f64>,
    pub orbit_class: OrbitClass,
    pub drift: Option<&'a DriftSummary>,
    pub drift_thresholds: &'a DriftThresholds,
    pub detections: &'a [Detection],
}

pub fn assess(inputs: &HealthInputs<'_>, params: &HealthParams) -> HealthVerdict {
    let weights = &params.weights;
    let mut findings = Vec::new();

    let inclination = match (
        inputs.target_inclination_deg,
        inputs.history.mean_inclination(),
        inputs.history.inclination_std(),
    ) {
        (None, _, _) => SubScore::unavailable(
            SubScoreKind::Inclination,
            weights.inclination,
            "no target inclination configured",
        ),
        (Some(_), None, _) | (Some(_), _, None) => SubScore::unavailable(
            SubScoreKind::Inclination,
            weights.inclination,
            "empty history",
        ),
        (Some(target), Some(mean), Some(std)) => {
            let deviation = (mean - target).abs();
            if deviation > params.inclination_tolerance_deg {
                findings.push(Finding::InclinationOutOfTolerance {
                    deviation_deg: deviation,
                    tolerance_deg: params.inclination_tolerance_deg,
                });
            }
            SubScore::scored(
                SubScoreKind::Inclination,
                inclination_score(mean, std, target, params.inclination_tolerance_deg),
                weights.inclination,
            )
        }
    };

    let mut epochs: Vec<_> = inputs
        .detections
        .iter()
        .flat_map(|d| d.events.iter().map(|e| e.epoch))
        .collect();
    epochs.sort();

    let span_days = inputs.history.span().num_seconds() as f64 / 86_400.0;
    let insufficient = inputs.detections.is_empty()
        || inputs
            .detections
            .iter()
            .any(|d| d.status == DetectionStatus::DataInsufficient);

    let mut per_month = None;
    let maintenance = if insufficient {
        SubScore::unavailable(
            SubScoreKind::Maintenance,
            weights.maintenance,
            "too few element sets for maneuver detection",
        )
    } else if span_days < 1.0 {
        SubScore::unavailable(
            SubScoreKind::Maintenance,
            weights.maintenance,
            "observation span under one day",
        )
    } else {
        let rate = maneuvers_per_month(epochs.len(), span_days);
        per_month = Some(rate);
        if rate < params.min_maneuvers_per_month {
            findings.push(Finding::LowMaintenance {
                per_month: rate,
                minimum: params.min_maneuvers_per_month,
            });
        } else if rate > params.max_maneuvers_per_month {
            findings.push(Finding::ExcessiveMaintenance {
                per_month: rate,
                maximum: params.max_maneuvers_per_month,
            });
        }
        SubScore::scored(
            SubScoreKind::Maintenance,
            maintenance_score(
                rate,
                params.min_maneuvers_per_month,
                params.max_maneuvers_per_month,
            ),
            weights.maintenance,
        )
    };

    let uniformity = match maneuver_uniformity(&epochs, params.uniformity_threshold) {
        Some(u) => {
            if u.cadence == Cadence::Irregular {
                findings.push(Finding::IrregularCadence {
                    coefficient_of_variation: u.coefficient_of_variation,
                });
            }
            SubScore::scored(
                SubScoreKind::Uniformity,
                uniformity_score(u.coefficient_of_variation, params.uniformity_threshold),
                weights.uniformity,
            )
        }
        None => SubScore::unavailable(
            SubScoreKind::Uniformity,
            weights.uniformity,
            "fewer than two maneuvers",
        ),
    };

    let drift = match inputs.drift {
        Some(summary) => {
            let thresholds = inputs.drift_thresholds;
            if summary.trend.direction() == Some(TrendDirection::Increasing) {
                if let Some(rate) = trend_rate(summary) {
                    findings.push(Finding::DriftIncreasing { rate });
                }
            }
            let limit = drift_stability_limit(inputs.orbit_class);
            if summary.std_deg_per_day > limit * thresholds.tolerance {
                findings.push(Finding::UnstableDrift {
                    std_deg_per_day: summary.std_deg_per_day,
                    tolerance: thresholds.tolerance,
                });
            }
            SubScore::scored(
                SubScoreKind::Drift,
                drift_score(summary, thresholds, inputs.orbit_class),
                weights.drift,
            )
        }
        None => SubScore::unavailable(SubScoreKind::Drift, weights.drift, "empty history"),
    };

    let mut sub_scores = vec![inclination, maintenance, uniformity, drift];
    let score = combine(&mut sub_scores);
    let status = status(score, params);

    if let Some(std) = inputs.history.inclination_std() {
        if std < params.stable_inclination_std_deg {
            findings.push(Finding::StableOrbit {
                inclination_std_deg: std,
            });
        }
    }

    log::debug!(
        "{} health {:?} ({}), {} findings",
        inputs.history.norad_id(),
        score,
        status,
        findings.len()
    );

    HealthVerdict {
        norad_id: inputs.history.norad_id(),
        score,
        status,
        orbit_class: inputs.orbit_class,
        maneuvers_per_month: per_month,
        sub_scores,
        findings,
    }
}

fn trend_rate(summary: &DriftSummary) -> Option<f64> {
    match summary.trend {
        DriftTrend::Trend { rate, .. } => Some(rate),
        DriftTrend::InsufficientData { .. } => None,
    }
}
