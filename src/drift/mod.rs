//! Longitudinal drift of geosynchronous satellites derived from mean motion.

mod types;

use chrono::{DateTime, Utc};

pub use types::{
    DriftDirection, DriftRecord, DriftSeverity, DriftSummary, DriftThresholds, DriftTrend,
    TrendDirection,
};

use crate::elements::{mean, sample_std, SatelliteHistory};

/// Mean motion of a perfectly geosynchronous orbit, rev/day.
pub const SYNCHRONOUS_MEAN_MOTION: f64 = 1.002_737_909;
/// Fewest samples a trend fit accepts.
pub const MIN_TREND_SAMPLES: usize = 3;

const STATIONARY_EPSILON: f64 = 1e-9;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Drift in deg/day relative to Earth rotation; positive is eastward.
pub fn longitudinal_drift(mean_motion: f64) -> f64 {
    (mean_motion - SYNCHRONOUS_MEAN_MOTION) * 360.0
}

pub fn drift_direction(rate_deg_per_day: f64) -> DriftDirection {
    if rate_deg_per_day > STATIONARY_EPSILON {
        DriftDirection::Eastward
    } else if rate_deg_per_day < -STATIONARY_EPSILON {
        DriftDirection::Westward
    } else {
        DriftDirection::Stationary
    }
}

pub fn classify_drift(rate_deg_per_day: f64, thresholds: &DriftThresholds) -> DriftSeverity {
    let magnitude = rate_deg_per_day.abs();
    if magnitude <= thresholds.tolerance {
        DriftSeverity::Nominal
    } else if magnitude >= thresholds.alert {
        DriftSeverity::Alert
    } else if magnitude >= thresholds.watch {
        DriftSeverity::Watch
    } else {
        DriftSeverity::Nominal
    }
}

pub fn drift_record(
    epoch: DateTime<Utc>,
    mean_motion: f64,
    thresholds: &DriftThresholds,
) -> DriftRecord {
    let rate = longitudinal_drift(mean_motion);
    DriftRecord {
        epoch,
        rate_deg_per_day: rate,
        direction: drift_direction(rate),
        severity: classify_drift(rate, thresholds),
    }
}

pub fn drift_records(history: &SatelliteHistory, thresholds: &DriftThresholds) -> Vec<DriftRecord> {
    history
        .states()
        .iter()
        .map(|s| drift_record(s.epoch, s.mean_motion, thresholds))
        .collect()
}

/// Least-squares slope of |drift| against time over the given samples.
pub fn drift_trend(samples: &[(DateTime<Utc>, f64)], tolerance: f64) -> DriftTrend {
    if samples.len() < MIN_TREND_SAMPLES {
        return DriftTrend::InsufficientData {
            samples: samples.len(),
        };
    }

    let t0 = samples[0].0;
    let xs: Vec<f64> = samples
        .iter()
        .map(|(t, _)| (*t - t0).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY)
        .collect();
    let ys: Vec<f64> = samples.iter().map(|(_, d)| d.abs()).collect();

    let n = samples.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;
    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    let sxy: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();

    if sxx <= f64::EPSILON {
        return DriftTrend::InsufficientData {
            samples: samples.len(),
        };
    }

    let rate = sxy / sxx;
    let direction = if rate > tolerance {
        TrendDirection::Increasing
    } else if rate < -tolerance {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Steady
    };

    DriftTrend::Trend {
        direction,
        rate,
        samples: samples.len(),
    }
}

/// Trend over the last `window` records.
pub fn trailing_trend(records: &[DriftRecord], window: usize, tolerance: f64) -> DriftTrend {
    let start = records.len().saturating_sub(window);
    let samples: Vec<_> = records[start..]
        .iter()
        .map(|r| (r.epoch, r.rate_deg_per_day))
        .collect();
    drift_trend(&samples, tolerance)
}

pub fn summarize(
    records: &[DriftRecord],
    thresholds: &DriftThresholds,
    trend_window: usize,
    trend_tolerance: f64,
) -> Option<DriftSummary> {
    let rates: Vec<f64> = records.iter().map(|r| r.rate_deg_per_day).collect();
    let mean_deg_per_day = mean(rates.iter().copied())?;
    let std_deg_per_day = sample_std(&rates)?;
    let current_deg_per_day = *rates.last()?;

    Some(DriftSummary {
        mean_deg_per_day,
        std_deg_per_day,
        current_deg_per_day,
        severity: classify_drift(mean_deg_per_day, thresholds),
        direction: drift_direction(mean_deg_per_day),
        trend: trailing_trend(records, trend_window, trend_tolerance),
    })
}
