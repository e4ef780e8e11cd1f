use log::{info, warn};

use super::types::{AnalysisStatus, SatelliteReport};
use crate::config::Config;
use crate::drift::{drift_records, summarize};
use crate::elements::{ElementSetSource, SatelliteHistory, SkippedRecord};
use crate::health::{assess, classify_orbit, HealthInputs};
use crate::maneuver::{detect_maneuvers, maneuver_uniformity, DetectionStatus, ManeuverKind};

/// Fetch, parse and analyse one satellite. Never fails: fetch errors and empty
/// histories become report statuses.
pub fn analyze_satellite(
    norad_id: u32,
    source: &dyn ElementSetSource,
    config: &Config,
) -> SatelliteReport {
    let entry = config.satellite(norad_id);
    let name = entry.map(|e| e.name.clone());
    let active = entry.map_or(true, |e| e.active);

    let raw = match source.element_sets(norad_id) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Fetching element sets for {} failed: {}", norad_id, e);
            let mut report =
                SatelliteReport::empty(norad_id, name, active, AnalysisStatus::FetchFailed);
            report.error = Some(e.to_string());
            return report;
        }
    };

    let (history, skipped) = SatelliteHistory::from_raw(norad_id, &raw, config.history.bounds());
    analyze_history(history, skipped, config)
}

/// Drift, maneuvers and health for an already-built history.
pub fn analyze_history(
    history: SatelliteHistory,
    skipped: Vec<SkippedRecord>,
    config: &Config,
) -> SatelliteReport {
    let norad_id = history.norad_id();
    let entry = config.satellite(norad_id);
    let name = entry
        .map(|e| e.name.clone())
        .or_else(|| history.name().map(str::to_string));
    let active = entry.map_or(true, |e| e.active);

    if history.is_empty() {
        info!("{}: no usable element sets", norad_id);
        let mut report =
            SatelliteReport::empty(norad_id, name, active, AnalysisStatus::DataInsufficient);
        report.skipped = skipped;
        report.rejected = history.rejected().len();
        return report;
    }

    let orbit_class = classify_orbit(
        history.mean_inclination(),
        config.health.igso_min_inclination_deg,
    );
    let thresholds = config.drift.thresholds(orbit_class);

    let drift = drift_records(&history, thresholds);
    let drift_summary = summarize(
        &drift,
        thresholds,
        config.drift.trend_window,
        config.drift.trend_tolerance,
    );

    let detections = vec![
        detect_maneuvers(
            &history.mean_motion_series(),
            ManeuverKind::EastWest,
            &config.maneuver.params(ManeuverKind::EastWest),
        ),
        detect_maneuvers(
            &history.inclination_series(),
            ManeuverKind::NorthSouth,
            &config.maneuver.params(ManeuverKind::NorthSouth),
        ),
    ];

    let mut maneuvers: Vec<_> = detections.iter().flat_map(|d| d.events.clone()).collect();
    maneuvers.sort_by_key(|e| e.epoch);
    let epochs: Vec<_> = maneuvers.iter().map(|e| e.epoch).collect();
    let uniformity = maneuver_uniformity(&epochs, config.health.uniformity_threshold);

    let health = assess(
        &HealthInputs {
            history: &history,
            target_inclination_deg: entry.and_then(|e| e.target_inclination_deg),
            orbit_class,
            drift: drift_summary.as_ref(),
            drift_thresholds: thresholds,
            detections: &detections,
        },
        &config.health,
    );

    let status = if detections
        .iter()
        .any(|d| d.status == DetectionStatus::DataInsufficient)
    {
        AnalysisStatus::DataInsufficient
    } else {
        AnalysisStatus::Ok
    };

    info!(
        "{}: {} element sets, {} maneuvers, health {}",
        norad_id,
        history.len(),
        maneuvers.len(),
        health.status
    );

    SatelliteReport {
        norad_id,
        name,
        active,
        status,
        error: None,
        element_sets: history.len(),
        skipped,
        rejected: history.rejected().len(),
        orbit_class,
        drift,
        drift_summary,
        detections,
        maneuvers,
        uniformity,
        health: Some(health),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{DirectorySource, RawElementSet, SourceError};
    use crate::health::{HealthStatus, OrbitClass};
    use crate::maneuver::ManeuverKind;
    use chrono::{TimeZone, Utc};

    const HISTORY: &str = include_str!("../../testdata/irnss_1c_history.tle");

    struct FailingSource;

    impl ElementSetSource for FailingSource {
        fn element_sets(&self, norad_id: u32) -> Result<Vec<RawElementSet>, SourceError> {
            Err(SourceError::NotFound(format!("catalog {}", norad_id)))
        }
    }

    fn source() -> DirectorySource {
        let mut source = DirectorySource::new("unused".into());
        source.add_document(HISTORY);
        source
    }

    #[test]
    fn irnss_1c_history_end_to_end() {
        let config = Config::default();
        let report = analyze_satellite(40269, &source(), &config);

        assert_eq!(report.status, AnalysisStatus::Ok);
        assert_eq!(report.name.as_deref(), Some("IRNSS-1C"));
        assert!(!report.active);
        assert_eq!(report.element_sets, 41);
        assert!(report.skipped.is_empty());
        assert_eq!(report.orbit_class, OrbitClass::Gso);
        assert_eq!(report.drift.len(), 41);

        let ew: Vec<_> = report
            .maneuvers
            .iter()
            .filter(|e| e.kind == ManeuverKind::EastWest)
            .collect();
        assert_eq!(ew.len(), 2, "events: {:?}", report.maneuvers);
        let first = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
        assert!((ew[0].epoch - first).num_days().abs() <= 3);
        assert!((ew[1].epoch - second).num_days().abs() <= 3);
        assert!(report
            .maneuvers
            .iter()
            .all(|e| e.kind == ManeuverKind::EastWest));

        let health = report.health.expect("health verdict");
        assert!(health.score.is_some());
        assert_ne!(health.status, HealthStatus::Unknown);
        assert!(health.maneuvers_per_month.is_some());
    }

    #[test]
    fn fetch_failure_is_reported() {
        let report = analyze_satellite(40269, &FailingSource, &Config::default());
        assert_eq!(report.status, AnalysisStatus::FetchFailed);
        assert!(report.error.unwrap().contains("40269"));
        assert!(report.health.is_none());
    }

    #[test]
    fn missing_data_is_insufficient() {
        let report = analyze_satellite(41241, &source(), &Config::default());
        assert_eq!(report.status, AnalysisStatus::DataInsufficient);
        assert_eq!(report.element_sets, 0);
        assert!(report.health.is_none());
        assert!(report.error.is_none());
    }

    #[test]
    fn short_history_is_insufficient_but_scored() {
        let mut source = DirectorySource::new("unused".into());
        source.add_document(include_str!("../../testdata/navic_2024.tle"));
        let report = analyze_satellite(41241, &source, &Config::default());

        assert_eq!(report.status, AnalysisStatus::DataInsufficient);
        assert_eq!(report.element_sets, 1);
        assert_eq!(report.orbit_class, OrbitClass::Igso);
        assert!(report.maneuvers.is_empty());
        let health = report.health.unwrap();
        // inclination and drift remain available
        assert!(health.score.is_some());
    }
}
