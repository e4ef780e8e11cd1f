use super::types::{HealthParams, HealthStatus, OrbitClass, SubScore};
use crate::drift::{DriftSummary, DriftThresholds, TrendDirection};

const DAYS_PER_MONTH: f64 = 30.0;

pub fn classify_orbit(mean_inclination_deg: Option<f64>, igso_min_inclination_deg: f64) -> OrbitClass {
    match mean_inclination_deg {
        Some(i) if i >= igso_min_inclination_deg => OrbitClass::Igso,
        Some(i) if i > 0.0 => OrbitClass::Gso,
        _ => OrbitClass::Unclassified,
    }
}

pub fn inclination_score(mean_deg: f64, std_deg: f64, target_deg: f64, tolerance_deg: f64) -> f64 {
    let deviation = (mean_deg - target_deg).abs();
    let penalty = deviation / tolerance_deg * 100.0 + (std_deg * 10.0).min(20.0);
    (100.0 - penalty).max(0.0)
}

/// Events per 30-day month over `span_days`.
pub fn maneuvers_per_month(events: usize, span_days: f64) -> f64 {
    events as f64 / (span_days / DAYS_PER_MONTH)
}

pub fn maintenance_score(per_month: f64, minimum: f64, maximum: f64) -> f64 {
    if per_month < minimum {
        30.0 + per_month / minimum * 40.0
    } else if per_month > maximum {
        let excess = per_month - maximum;
        100.0 - (excess / maximum * 60.0).min(40.0)
    } else {
        100.0
    }
}

pub fn uniformity_score(coefficient_of_variation: f64, threshold: f64) -> f64 {
    if coefficient_of_variation <= threshold {
        100.0
    } else {
        100.0 - ((coefficient_of_variation - threshold) / threshold * 50.0).min(50.0)
    }
}

/// Stability ratio (std / tolerance) above which drift counts as unstable.
pub fn drift_stability_limit(class: OrbitClass) -> f64 {
    match class {
        OrbitClass::Igso => 1.0,
        OrbitClass::Gso | OrbitClass::Unclassified => 2.0,
    }
}

/// GSO ladder: 100 / 80 / 60 / 40 / 0 by tolerance, watch and alert. IGSO
/// orbits swing far more in longitude, so they get 100 / 70 / 40.
pub fn drift_score(summary: &DriftSummary, thresholds: &DriftThresholds, class: OrbitClass) -> f64 {
    let magnitude = summary.mean_deg_per_day.abs();
    let tol = thresholds.tolerance;

    let (mut score, max_penalty) = match class {
        OrbitClass::Igso => {
            let base = if magnitude <= tol {
                100.0
            } else if magnitude <= thresholds.alert {
                70.0
            } else {
                40.0
            };
            (base, 20.0)
        }
        OrbitClass::Gso | OrbitClass::Unclassified => {
            let base = if magnitude <= 0.3 * tol {
                100.0
            } else if magnitude <= tol {
                80.0
            } else if magnitude <= thresholds.watch {
                60.0
            } else if magnitude <= thresholds.alert {
                40.0
            } else {
                0.0
            };
            (base, 30.0)
        }
    };

    let stability = summary.std_deg_per_day / tol;
    let limit = drift_stability_limit(class);
    if stability > limit {
        score -= ((stability - limit) * 10.0).min(max_penalty);
    }

    match summary.trend.direction() {
        Some(TrendDirection::Increasing) => score -= 10.0,
        Some(TrendDirection::Decreasing) => score = (score + 5.0).min(100.0),
        _ => {}
    }
    score.clamp(0.0, 100.0)
}

/// Fill in effective weights and return the weighted score, `None` when nothing is available.
pub fn combine(sub_scores: &mut [SubScore]) -> Option<f64> {
    let available: f64 = sub_scores
        .iter()
        .filter(|s| s.score.is_some())
        .map(|s| s.weight)
        .sum();
    if available <= 0.0 {
        for s in sub_scores.iter_mut() {
            s.effective_weight = 0.0;
        }
        return None;
    }

    let mut total = 0.0;
    for s in sub_scores.iter_mut() {
        match s.score {
            Some(score) => {
                s.effective_weight = s.weight / available;
                total += s.effective_weight * score;
            }
            None => s.effective_weight = 0.0,
        }
    }
    Some(total.clamp(0.0, 100.0))
}

pub fn status(score: Option<f64>, params: &HealthParams) -> HealthStatus {
    match score {
        Some(s) if s >= params.healthy => HealthStatus::Healthy,
        Some(s) if s >= params.degraded => HealthStatus::Degraded,
        Some(_) => HealthStatus::Critical,
        None => HealthStatus::Unknown,
    }
}
