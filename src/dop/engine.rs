use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::geometry::compute_dop;
use super::grid::TimeGrid;
use super::types::{CoverageSummary, DopBands, DopQuality, DopSample};
use crate::elements::SatelliteHistory;
use crate::propagate::{GroundPoint, LookAngles, Propagator};

/// Propagators for every usable element set of one satellite, in epoch order.
struct TrackedSatellite {
    norad_id: u32,
    propagators: Vec<(DateTime<Utc>, Propagator)>,
}

impl TrackedSatellite {
    fn from_history(history: &SatelliteHistory) -> Self {
        let mut propagators = Vec::with_capacity(history.len());
        for state in history.states() {
            match Propagator::new(state) {
                Ok(p) => propagators.push((state.epoch, p)),
                Err(e) => warn!(
                    "Skipping element set {} at {}: {}",
                    state.norad_id, state.epoch, e
                ),
            }
        }
        Self {
            norad_id: history.norad_id(),
            propagators,
        }
    }

    /// Latest element set at or before `at`, else the earliest one.
    fn propagator_at(&self, at: DateTime<Utc>) -> Option<&Propagator> {
        let idx = self.propagators.partition_point(|(epoch, _)| *epoch <= at);
        let idx = idx.saturating_sub(1);
        self.propagators.get(idx).map(|(_, p)| p)
    }
}

/// Dilution-of-precision sampler over a fixed satellite set.
pub struct DopEngine {
    satellites: Vec<TrackedSatellite>,
    elevation_mask_deg: f64,
    bands: DopBands,
}

impl DopEngine {
    pub fn new<'a>(
        histories: impl IntoIterator<Item = &'a SatelliteHistory>,
        elevation_mask_deg: f64,
        bands: DopBands,
    ) -> Self {
        let satellites: Vec<_> = histories
            .into_iter()
            .map(TrackedSatellite::from_history)
            .filter(|s| {
                if s.propagators.is_empty() {
                    warn!("Satellite {} has no propagatable element sets", s.norad_id);
                }
                !s.propagators.is_empty()
            })
            .collect();
        debug!("DOP engine tracking {} satellites", satellites.len());
        Self {
            satellites,
            elevation_mask_deg,
            bands,
        }
    }

    pub fn satellite_count(&self) -> usize {
        self.satellites.len()
    }

    /// Satellites strictly above the mask from `point` at `timestamp`, with their look angles.
    pub fn visible(
        &self,
        point: &GroundPoint,
        timestamp: DateTime<Utc>,
    ) -> (Vec<(u32, LookAngles)>, usize) {
        let mut visible = Vec::new();
        let mut failed = 0;
        for sat in &self.satellites {
            let Some(propagator) = sat.propagator_at(timestamp) else {
                continue;
            };
            match propagator.look_angles(point, timestamp) {
                Ok(angles) if angles.elevation_deg > self.elevation_mask_deg => {
                    visible.push((sat.norad_id, angles))
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Propagation of {} at {} failed: {}", sat.norad_id, timestamp, e);
                    failed += 1;
                }
            }
        }
        (visible, failed)
    }

    pub fn sample(&self, point: &GroundPoint, timestamp: DateTime<Utc>) -> DopSample {
        let (visible, failed_propagations) = self.visible(point, timestamp);
        let angles: Vec<LookAngles> = visible.iter().map(|(_, a)| *a).collect();

        let (dop, unavailable, quality) = match compute_dop(&angles) {
            Ok(values) => (Some(values), None, self.bands.classify(values.gdop)),
            Err(reason) => (None, Some(reason), DopQuality::Unavailable),
        };

        DopSample {
            ground_point: point.name.clone(),
            timestamp,
            visible_count: visible.len(),
            visible: visible.into_iter().map(|(id, _)| id).collect(),
            failed_propagations,
            quality,
            dop,
            unavailable,
        }
    }

    /// One sample per ground point and grid instant, grouped by ground point.
    pub fn evaluate(&self, points: &[GroundPoint], grid: &TimeGrid) -> Vec<DopSample> {
        let mut samples = Vec::with_capacity(points.len() * grid.len());
        for point in points {
            samples.extend(grid.timestamps().map(|t| self.sample(point, t)));
        }
        samples
    }
}

/// Availability and DOP statistics per ground point, in first-seen order.
pub fn summarize_coverage(samples: &[DopSample]) -> Vec<CoverageSummary> {
    let mut names: Vec<&str> = Vec::new();
    for sample in samples {
        if !names.contains(&sample.ground_point.as_str()) {
            names.push(&sample.ground_point);
        }
    }

    names
        .into_iter()
        .map(|name| {
            let own: Vec<&DopSample> = samples.iter().filter(|s| s.ground_point == name).collect();
            let pdop: Vec<f64> = own.iter().filter_map(|s| s.dop.map(|d| d.pdop)).collect();
            let gdop: Vec<f64> = own.iter().filter_map(|s| s.dop.map(|d| d.gdop)).collect();
            let (pdop_min, pdop_mean, pdop_max) = stats(&pdop);
            let (gdop_min, gdop_mean, gdop_max) = stats(&gdop);
            CoverageSummary {
                ground_point: name.to_string(),
                samples: own.len(),
                available: pdop.len(),
                availability: if own.is_empty() {
                    0.0
                } else {
                    pdop.len() as f64 / own.len() as f64
                },
                pdop_min,
                pdop_mean,
                pdop_max,
                gdop_min,
                gdop_mean,
                gdop_max,
            }
        })
        .collect()
}

fn stats(values: &[f64]) -> (Option<f64>, Option<f64>, Option<f64>) {
    if values.is_empty() {
        return (None, None, None);
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (Some(min), Some(mean), Some(max))
}
