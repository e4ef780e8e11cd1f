use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("step must be positive")]
    NonPositiveStep,
    #[error("duration must not be negative")]
    NegativeDuration,
}

/// Evenly spaced instants from `start` up to and including `start + duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    start: DateTime<Utc>,
    step: Duration,
    count: usize,
}

impl TimeGrid {
    pub fn new(start: DateTime<Utc>, duration: Duration, step: Duration) -> Result<Self, GridError> {
        if step <= Duration::zero() {
            return Err(GridError::NonPositiveStep);
        }
        if duration < Duration::zero() {
            return Err(GridError::NegativeDuration);
        }
        let steps = duration.num_milliseconds() / step.num_milliseconds().max(1);
        Ok(Self {
            start,
            step,
            count: steps as usize + 1,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.count).map(move |i| self.start + self.step * i as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn includes_both_ends() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let grid = TimeGrid::new(start, Duration::hours(1), Duration::minutes(15)).unwrap();
        let stamps: Vec<_> = grid.timestamps().collect();
        assert_eq!(stamps.len(), 5);
        assert_eq!(stamps[0], start);
        assert_eq!(stamps[4], start + Duration::hours(1));
    }

    #[test]
    fn partial_final_step_is_dropped() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let grid = TimeGrid::new(start, Duration::minutes(40), Duration::minutes(15)).unwrap();
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn rejects_bad_steps() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            TimeGrid::new(start, Duration::hours(1), Duration::zero()),
            Err(GridError::NonPositiveStep)
        );
        assert_eq!(
            TimeGrid::new(start, Duration::hours(-1), Duration::minutes(1)),
            Err(GridError::NegativeDuration)
        );
    }
}
