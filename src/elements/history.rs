use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::parsing::parse_element_set;
use super::types::{OrbitalState, RawElementSet};

/// Plausibility band for mean motion (rev/day); states outside are rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanMotionBounds {
    pub min: f64,
    pub max: f64,
}

impl MeanMotionBounds {
    pub fn contains(&self, mean_motion: f64) -> bool {
        (self.min..=self.max).contains(&mean_motion)
    }
}

/// A record that did not make it into a history.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// Epoch-ordered element sets of one satellite.
#[derive(Debug, Clone, Default)]
pub struct SatelliteHistory {
    norad_id: u32,
    states: Vec<OrbitalState>,
    rejected: Vec<OrbitalState>,
}

impl SatelliteHistory {
    pub fn new(norad_id: u32) -> Self {
        Self {
            norad_id,
            states: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Build from parsed states in any order. Same-epoch duplicates collapse to
    /// the one given last; implausible mean motions go to the rejected list.
    pub fn from_states(
        norad_id: u32,
        states: impl IntoIterator<Item = OrbitalState>,
        bounds: MeanMotionBounds,
    ) -> Self {
        let mut history = Self::new(norad_id);
        for state in states {
            history.insert(state, bounds);
        }
        history
    }

    /// Parse raw records, skipping malformed ones and records for other satellites.
    pub fn from_raw(
        norad_id: u32,
        records: &[RawElementSet],
        bounds: MeanMotionBounds,
    ) -> (Self, Vec<SkippedRecord>) {
        let mut history = Self::new(norad_id);
        let mut skipped = Vec::new();

        for (index, raw) in records.iter().enumerate() {
            match parse_element_set(raw) {
                Ok(state) if state.norad_id != norad_id => {
                    log::warn!(
                        "element set {} belongs to {}, not {}",
                        index,
                        state.norad_id,
                        norad_id
                    );
                    skipped.push(SkippedRecord {
                        index,
                        reason: format!("catalog number {} does not match", state.norad_id),
                    });
                }
                Ok(state) => history.insert(state, bounds),
                Err(e) => {
                    log::warn!("skipping element set {} for {}: {}", index, norad_id, e);
                    skipped.push(SkippedRecord {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        (history, skipped)
    }

    fn insert(&mut self, state: OrbitalState, bounds: MeanMotionBounds) {
        if !bounds.contains(state.mean_motion) {
            log::warn!(
                "{}: mean motion {} rev/day at {} outside [{}, {}], flagged invalid",
                self.norad_id,
                state.mean_motion,
                state.epoch,
                bounds.min,
                bounds.max
            );
            self.rejected.push(state);
            return;
        }

        // Position after every state with epoch <= the new one.
        let pos = self.states.partition_point(|s| s.epoch <= state.epoch);
        if pos > 0 && self.states[pos - 1].epoch == state.epoch {
            self.states[pos - 1] = state;
        } else {
            self.states.insert(pos, state);
        }
    }

    pub fn norad_id(&self) -> u32 {
        self.norad_id
    }

    pub fn states(&self) -> &[OrbitalState] {
        &self.states
    }

    pub fn rejected(&self) -> &[OrbitalState] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&OrbitalState> {
        self.states.first()
    }

    pub fn latest(&self) -> Option<&OrbitalState> {
        self.states.last()
    }

    pub fn name(&self) -> Option<&str> {
        self.states.iter().rev().find_map(|s| s.name.as_deref())
    }

    /// Latest state with epoch at or before `at`, falling back to the earliest one.
    pub fn state_at(&self, at: DateTime<Utc>) -> Option<&OrbitalState> {
        let pos = self.states.partition_point(|s| s.epoch <= at);
        if pos == 0 {
            self.states.first()
        } else {
            self.states.get(pos - 1)
        }
    }

    pub fn span(&self) -> Duration {
        match (self.states.first(), self.states.last()) {
            (Some(first), Some(last)) => last.epoch - first.epoch,
            _ => Duration::zero(),
        }
    }

    pub fn mean_motion_series(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.states.iter().map(|s| (s.epoch, s.mean_motion)).collect()
    }

    pub fn inclination_series(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.states
            .iter()
            .map(|s| (s.epoch, s.inclination_deg))
            .collect()
    }

    pub fn mean_inclination(&self) -> Option<f64> {
        mean(self.states.iter().map(|s| s.inclination_deg))
    }

    /// Sample standard deviation of inclination; zero for a single state.
    pub fn inclination_std(&self) -> Option<f64> {
        sample_std(
            &self
                .states
                .iter()
                .map(|s| s.inclination_deg)
                .collect::<Vec<_>>(),
        )
    }
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    let m = mean(values.iter().copied())?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}
