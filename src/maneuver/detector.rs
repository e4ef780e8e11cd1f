use std::ops::Range;

use chrono::{DateTime, Utc};

use super::types::{
    Cadence, Confidence, Detection, DetectionStatus, DetectorParams, ManeuverEvent, ManeuverKind,
    Uniformity,
};
use super::window::{mad, median, SlidingWindow};

/// Consistency constant of the modified z-score.
pub const MAD_SCALE: f64 = 0.6745;
/// |z| assigned when the window spread is zero but the sample deviates.
pub const SATURATED_Z: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredSample {
    pub epoch: DateTime<Utc>,
    pub value: f64,
    pub baseline: f64,
    pub deviation: f64,
    pub z_score: f64,
}

/// `0.6745 * (value - median) / mad`. A zero spread gives 0 on an exact match
/// and a saturated score otherwise.
pub fn modified_z_score(value: f64, median: f64, mad: f64) -> f64 {
    let deviation = value - median;
    if mad > 0.0 {
        (MAD_SCALE * deviation / mad).clamp(-SATURATED_Z, SATURATED_Z)
    } else if deviation == 0.0 {
        0.0
    } else {
        SATURATED_Z.copysign(deviation)
    }
}

/// Score every sample against the rolling median / MAD of its baseline window.
pub fn score_series(series: &[(DateTime<Utc>, f64)], window: SlidingWindow) -> Vec<ScoredSample> {
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();

    series
        .iter()
        .enumerate()
        .map(|(i, (epoch, value))| {
            let mut baseline_values = window.baseline(i, values.len()).values(&values);
            let (baseline, z_score) = match median(&mut baseline_values) {
                Some(med) => {
                    let spread = mad(&baseline_values, med).unwrap_or(0.0);
                    (med, modified_z_score(*value, med, spread))
                }
                None => (*value, 0.0),
            };
            ScoredSample {
                epoch: *epoch,
                value: *value,
                baseline,
                deviation: value - baseline,
                z_score,
            }
        })
        .collect()
}

/// Find sustained step changes in an epoch-indexed series.
pub fn detect_maneuvers(
    series: &[(DateTime<Utc>, f64)],
    kind: ManeuverKind,
    params: &DetectorParams,
) -> Detection {
    let mut series = series.to_vec();
    series.sort_by_key(|(epoch, _)| *epoch);

    let window = SlidingWindow::for_series(
        series.len(),
        params.window,
        params.min_window,
        params.max_window,
    );

    if series.len() < params.min_window.max(1) {
        log::debug!(
            "{} series has {} samples, need {}",
            kind,
            series.len(),
            params.min_window
        );
        return Detection {
            kind,
            status: DetectionStatus::DataInsufficient,
            samples: series.len(),
            window: window.size(),
            events: Vec::new(),
        };
    }

    let scored = score_series(&series, window);
    let runs = persistent_runs(&scored, params);
    let events = merge_runs(&scored, runs, kind, params);

    log::debug!(
        "{} detection: {} samples, window {}, {} events",
        kind,
        scored.len(),
        window.size(),
        events.len()
    );

    Detection {
        kind,
        status: DetectionStatus::Ok,
        samples: scored.len(),
        window: window.size(),
        events,
    }
}

fn candidate_sign(sample: &ScoredSample, params: &DetectorParams) -> Option<bool> {
    let flagged = sample.z_score.abs() > params.z_threshold
        && sample.deviation.abs() >= params.min_deviation;
    flagged.then(|| sample.deviation > 0.0)
}

/// Runs of consecutive same-sign candidates at least `min_run_length` long.
fn persistent_runs(scored: &[ScoredSample], params: &DetectorParams) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut current: Option<(usize, bool)> = None;

    for (i, sample) in scored.iter().enumerate() {
        let sign = candidate_sign(sample, params);
        match (current, sign) {
            (Some((_, run_sign)), Some(s)) if run_sign == s => {}
            (Some((start, _)), _) => {
                runs.push(start..i);
                current = sign.map(|s| (i, s));
            }
            (None, Some(s)) => current = Some((i, s)),
            (None, None) => {}
        }
    }
    if let Some((start, _)) = current {
        runs.push(start..scored.len());
    }

    let min_run = params.min_run_length.max(1);
    runs.retain(|r| r.len() >= min_run);
    runs
}

fn merge_runs(
    scored: &[ScoredSample],
    runs: Vec<Range<usize>>,
    kind: ManeuverKind,
    params: &DetectorParams,
) -> Vec<ManeuverEvent> {
    let mut clusters: Vec<Vec<Range<usize>>> = Vec::new();
    for run in runs {
        let joins_previous = clusters
            .last()
            .and_then(|cluster| cluster.last())
            .is_some_and(|prev| {
                scored[run.start].epoch - scored[prev.end - 1].epoch <= params.merge_gap
            });
        if joins_previous {
            if let Some(cluster) = clusters.last_mut() {
                cluster.push(run);
                continue;
            }
        }
        clusters.push(vec![run]);
    }

    clusters
        .iter()
        .filter_map(|cluster| {
            let indices = cluster.iter().flat_map(|r| r.clone());
            let run_length = cluster.iter().map(|r| r.len()).sum();
            let peak = indices.fold(None::<&ScoredSample>, |best, i| {
                let sample = &scored[i];
                match best {
                    Some(b) if !is_stronger(sample, b) => Some(b),
                    _ => Some(sample),
                }
            })?;
            let confidence = if peak.z_score.abs() >= 2.0 * params.z_threshold
                && peak.deviation.abs() >= 2.0 * params.min_deviation
            {
                Confidence::High
            } else {
                Confidence::Low
            };
            Some(ManeuverEvent {
                epoch: peak.epoch,
                kind,
                z_score: peak.z_score,
                deviation: peak.deviation,
                run_length,
                confidence,
            })
        })
        .collect()
}

/// Larger |z| wins, then larger |deviation|; ties keep the earlier sample.
fn is_stronger(candidate: &ScoredSample, current: &ScoredSample) -> bool {
    let (cz, bz) = (candidate.z_score.abs(), current.z_score.abs());
    cz > bz || (cz == bz && candidate.deviation.abs() > current.deviation.abs())
}

/// Coefficient of variation of the gaps between consecutive maneuvers, in days.
pub fn maneuver_uniformity(epochs: &[DateTime<Utc>], threshold: f64) -> Option<Uniformity> {
    if epochs.len() < 2 {
        return None;
    }
    let mut sorted = epochs.to_vec();
    sorted.sort();

    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64 / 86_400.0)
        .collect();
    let mean_gap_days = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if mean_gap_days <= 0.0 {
        return None;
    }
    let variance = gaps.iter().map(|g| (g - mean_gap_days).powi(2)).sum::<f64>() / gaps.len() as f64;
    let coefficient_of_variation = variance.sqrt() / mean_gap_days;

    Some(Uniformity {
        coefficient_of_variation,
        mean_gap_days,
        cadence: if coefficient_of_variation <= threshold {
            Cadence::Uniform
        } else {
            Cadence::Irregular
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone};

    const BASE: f64 = 1.002_737_91;
    const STEP: f64 = 1.0e-4;

    fn params() -> DetectorParams {
        DetectorParams {
            z_threshold: 3.5,
            window: None,
            min_window: 5,
            max_window: 31,
            min_run_length: 2,
            merge_gap: Duration::days(2),
            min_deviation: 1.5e-5,
        }
    }

    fn t(i: usize) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(24 * i as i64)
    }

    fn series(values: impl IntoIterator<Item = f64>) -> Vec<(DateTime<Utc>, f64)> {
        values.into_iter().enumerate().map(|(i, v)| (t(i), v)).collect()
    }

    /// Deterministic noise in [-amplitude, amplitude].
    fn noise(len: usize, amplitude: f64) -> Vec<f64> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
                (unit * 2.0 - 1.0) * amplitude
            })
            .collect()
    }

    #[test]
    fn zero_mad_convention() {
        assert_eq!(modified_z_score(5.0, 5.0, 0.0), 0.0);
        assert_eq!(modified_z_score(5.1, 5.0, 0.0), SATURATED_Z);
        assert_eq!(modified_z_score(4.9, 5.0, 0.0), -SATURATED_Z);
        assert_abs_diff_eq!(modified_z_score(6.0, 5.0, 1.0), 0.6745);
    }

    #[test]
    fn constant_series_has_no_events() {
        let detection = detect_maneuvers(&series(vec![BASE; 40]), ManeuverKind::EastWest, &params());
        assert_eq!(detection.status, DetectionStatus::Ok);
        assert!(detection.events.is_empty());
    }

    #[test]
    fn sustained_step_is_one_event_at_the_step() {
        let values = (0..40).map(|i| if i >= 20 { BASE + STEP } else { BASE });
        let detection = detect_maneuvers(&series(values), ManeuverKind::EastWest, &params());
        assert_eq!(detection.events.len(), 1);
        let event = &detection.events[0];
        assert_eq!(event.epoch, t(20));
        assert_eq!(event.kind, ManeuverKind::EastWest);
        assert_eq!(event.z_score, SATURATED_Z);
        assert_abs_diff_eq!(event.deviation, STEP, epsilon = 1e-12);
        assert!(event.run_length >= 2);
        assert_eq!(event.confidence, Confidence::High);
    }

    #[test]
    fn early_step_is_found_at_the_step_with_its_sign() {
        for at in 2..=5 {
            for step in [STEP, -STEP] {
                let values = (0..40).map(|i| if i >= at { BASE + step } else { BASE });
                let detection = detect_maneuvers(&series(values), ManeuverKind::EastWest, &params());
                assert_eq!(detection.events.len(), 1, "step at {}", at);
                let event = &detection.events[0];
                assert_eq!(event.epoch, t(at), "step at {}", at);
                assert_eq!(event.deviation.signum(), step.signum(), "step at {}", at);
            }
        }
    }

    #[test]
    fn step_without_baseline_is_not_misattributed() {
        // only one sample precedes the step
        let values = (0..40).map(|i| if i >= 1 { BASE + STEP } else { BASE });
        let detection = detect_maneuvers(&series(values), ManeuverKind::EastWest, &params());
        assert!(detection.events.iter().all(|e| e.deviation > 0.0 && e.epoch >= t(1)));
    }

    #[test]
    fn step_in_last_samples_respects_run_length() {
        let values = (0..40).map(|i| if i >= 38 { BASE + STEP } else { BASE });
        let detection = detect_maneuvers(&series(values), ManeuverKind::EastWest, &params());
        assert_eq!(detection.events.len(), 1);
        assert_eq!(detection.events[0].epoch, t(38));
        assert_eq!(detection.events[0].run_length, 2);

        let values = (0..40).map(|i| if i == 39 { BASE + STEP } else { BASE });
        let detection = detect_maneuvers(&series(values), ManeuverKind::EastWest, &params());
        assert!(detection.events.is_empty());
    }

    #[test]
    fn single_sample_spike_is_noise() {
        let values = (0..40).map(|i| if i == 20 { BASE + STEP } else { BASE });
        let detection = detect_maneuvers(&series(values), ManeuverKind::EastWest, &params());
        assert_eq!(detection.status, DetectionStatus::Ok);
        assert!(detection.events.is_empty());
    }

    #[test]
    fn step_in_noisy_series_is_found_near_injection() {
        let values: Vec<f64> = noise(60, 2e-7)
            .into_iter()
            .enumerate()
            .map(|(i, n)| BASE + n + if i >= 30 { -STEP } else { 0.0 })
            .collect();
        let detection = detect_maneuvers(&series(values), ManeuverKind::EastWest, &params());
        assert_eq!(detection.window, 6);
        assert_eq!(detection.events.len(), 1);
        let event = &detection.events[0];
        assert!(event.epoch >= t(30) && event.epoch <= t(32), "{:?}", event);
        assert!(event.deviation < 0.0);
    }

    #[test]
    fn noise_below_minimum_deviation_is_ignored() {
        let values: Vec<f64> = noise(60, 2e-7).into_iter().map(|n| BASE + n).collect();
        let detection = detect_maneuvers(&series(values), ManeuverKind::EastWest, &params());
        assert!(detection.events.is_empty());
    }

    #[test]
    fn detection_is_idempotent() {
        let values: Vec<f64> = noise(50, 2e-7)
            .into_iter()
            .enumerate()
            .map(|(i, n)| BASE + n + if i >= 25 { STEP } else { 0.0 })
            .collect();
        let s = series(values);
        let first = detect_maneuvers(&s, ManeuverKind::EastWest, &params());
        let second = detect_maneuvers(&s, ManeuverKind::EastWest, &params());
        assert_eq!(first, second);
    }

    #[test]
    fn nearby_runs_merge_distant_ones_do_not() {
        // up at 20, back down at 26
        let values: Vec<f64> = (0..40)
            .map(|i| if (20..26).contains(&i) { BASE + STEP } else { BASE })
            .collect();

        let apart = detect_maneuvers(&series(values.clone()), ManeuverKind::EastWest, &params());
        assert_eq!(apart.events.len(), 2);
        assert_eq!(apart.events[0].epoch, t(20));
        assert_eq!(apart.events[1].epoch, t(26));

        let mut wide = params();
        wide.merge_gap = Duration::days(5);
        let merged = detect_maneuvers(&series(values), ManeuverKind::EastWest, &wide);
        assert_eq!(merged.events.len(), 1);
        assert_eq!(merged.events[0].epoch, t(20));
        assert_eq!(merged.events[0].run_length, 6);
    }

    #[test]
    fn unsorted_input_gives_same_events() {
        let values = (0..30).map(|i| if i >= 12 { BASE + STEP } else { BASE });
        let mut s = series(values);
        let sorted = detect_maneuvers(&s, ManeuverKind::EastWest, &params());
        s.reverse();
        assert_eq!(detect_maneuvers(&s, ManeuverKind::EastWest, &params()), sorted);
    }

    #[test]
    fn short_series_is_data_insufficient() {
        let values = vec![BASE, BASE + STEP, BASE, BASE];
        let detection = detect_maneuvers(&series(values), ManeuverKind::NorthSouth, &params());
        assert_eq!(detection.status, DetectionStatus::DataInsufficient);
        assert!(detection.events.is_empty());
        assert_eq!(detection.samples, 4);
    }

    #[test]
    fn regular_cadence_is_uniform() {
        let epochs: Vec<_> = (0..5).map(|i| t(i * 14)).collect();
        let u = maneuver_uniformity(&epochs, 0.8).unwrap();
        assert_abs_diff_eq!(u.coefficient_of_variation, 0.0);
        assert_abs_diff_eq!(u.mean_gap_days, 14.0);
        assert_eq!(u.cadence, Cadence::Uniform);
    }

    #[test]
    fn irregular_cadence_is_flagged() {
        let epochs = vec![t(0), t(1), t(30), t(31)];
        let u = maneuver_uniformity(&epochs, 0.8).unwrap();
        assert!(u.coefficient_of_variation > 0.8);
        assert_eq!(u.cadence, Cadence::Irregular);
    }

    #[test]
    fn uniformity_needs_two_events() {
        assert!(maneuver_uniformity(&[t(3)], 0.8).is_none());
        assert!(maneuver_uniformity(&[t(3), t(3)], 0.8).is_none());
    }
}
