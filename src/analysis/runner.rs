use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::task::JoinSet;

use super::error::AnalysisError;
use super::satellite::analyze_satellite;
use super::types::{DopReport, SatelliteReport};
use crate::config::Config;
use crate::dop::{ground_track_boxes, summarize_coverage, DopEngine, TimeGrid};
use crate::elements::{ElementSetSource, SatelliteHistory};

/// Analyse every satellite in `norad_ids` in parallel; results come back sorted by catalog id.
pub async fn analyze_constellation<S>(
    source: Arc<S>,
    config: Arc<Config>,
    norad_ids: Vec<u32>,
) -> Result<Vec<SatelliteReport>, AnalysisError>
where
    S: ElementSetSource + Send + Sync + 'static,
{
    let mut tasks = JoinSet::new();
    for norad_id in norad_ids {
        let source = Arc::clone(&source);
        let config = Arc::clone(&config);
        tasks.spawn_blocking(move || analyze_satellite(norad_id, source.as_ref(), &config));
    }

    let mut reports = Vec::with_capacity(tasks.len());
    while let Some(result) = tasks.join_next().await {
        reports.push(result?);
    }
    reports.sort_by_key(|r| r.norad_id);

    info!("Analysed {} satellites", reports.len());
    Ok(reports)
}

/// Load histories for the configured satellites, skipping those that fail or have no data.
pub fn load_histories(source: &dyn ElementSetSource, config: &Config) -> Vec<SatelliteHistory> {
    let mut histories = Vec::new();
    for entry in &config.satellites {
        let raw = match source.element_sets(entry.norad_id) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Fetching element sets for {} failed: {}", entry.norad_id, e);
                continue;
            }
        };
        let (history, _) =
            SatelliteHistory::from_raw(entry.norad_id, &raw, config.history.bounds());
        if history.is_empty() {
            warn!("No usable element sets for {} ({})", entry.name, entry.norad_id);
            continue;
        }
        histories.push(history);
    }
    histories
}

/// DOP samples for every ground point over the configured window, plus ground-track boxes.
///
/// The window starts at `start`, else the configured start, else the latest
/// epoch across the loaded histories.
pub fn run_dop(
    source: &dyn ElementSetSource,
    config: &Config,
    start: Option<DateTime<Utc>>,
) -> Result<DopReport, AnalysisError> {
    let points = config.ground_points()?;
    let histories = load_histories(source, config);

    let start = start
        .or(config.window.start)
        .or_else(|| histories.iter().filter_map(|h| h.latest()).map(|s| s.epoch).max())
        .ok_or(AnalysisError::NoData)?;
    let grid = TimeGrid::new(start, config.window.duration, config.window.step)?;

    let active = config.active_ids();
    let dop_histories: Vec<&SatelliteHistory> = histories
        .iter()
        .filter(|h| active.contains(&h.norad_id()))
        .collect();
    let satellites = dop_histories.iter().map(|h| h.norad_id()).collect();
    let engine = DopEngine::new(
        dop_histories,
        config.dop.elevation_mask_deg,
        config.dop.bands,
    );

    info!(
        "DOP over {} ground points, {} instants from {}",
        points.len(),
        grid.len(),
        start
    );
    let samples = engine.evaluate(&points, &grid);
    let coverage = summarize_coverage(&samples);
    let ground_tracks = histories
        .iter()
        .filter_map(|h| ground_track_boxes(h, &grid))
        .collect();

    Ok(DopReport {
        window_start: start,
        window_end: start + config.window.duration,
        step_seconds: config.window.step.num_seconds(),
        elevation_mask_deg: config.dop.elevation_mask_deg,
        satellites,
        coverage,
        samples,
        ground_tracks,
    })
}
