use log::debug;

use super::grid::TimeGrid;
use super::types::{BoundingBox, GroundTrackBoxes, GroundTrackPoint};
use crate::elements::SatelliteHistory;
use crate::propagate::Propagator;

/// A jump larger than this between consecutive samples is an antimeridian crossing.
const WRAP_THRESHOLD_DEG: f64 = 180.0;

/// Sub-satellite points over `grid`, plus the number of instants that failed to propagate.
pub fn ground_track(propagator: &Propagator, grid: &TimeGrid) -> (Vec<GroundTrackPoint>, usize) {
    let mut points = Vec::with_capacity(grid.len());
    let mut skipped = 0;
    for timestamp in grid.timestamps() {
        match propagator.position(timestamp) {
            Ok(pos) => points.push(GroundTrackPoint {
                timestamp,
                latitude_deg: pos.latitude_deg,
                longitude_deg: pos.longitude_deg,
            }),
            Err(e) => {
                debug!("Ground track of {} at {}: {}", propagator.norad_id(), timestamp, e);
                skipped += 1;
            }
        }
    }
    (points, skipped)
}

/// One box per contiguous segment; a new segment starts at every antimeridian crossing.
pub fn bounding_boxes(track: &[GroundTrackPoint]) -> Vec<BoundingBox> {
    let mut boxes = Vec::new();
    let mut segment_start = 0;
    for i in 1..=track.len() {
        let split = i == track.len()
            || (track[i].longitude_deg - track[i - 1].longitude_deg).abs() > WRAP_THRESHOLD_DEG;
        if split {
            if let Some(bbox) = segment_box(&track[segment_start..i]) {
                boxes.push(bbox);
            }
            segment_start = i;
        }
    }
    boxes
}

fn segment_box(segment: &[GroundTrackPoint]) -> Option<BoundingBox> {
    let first = segment.first()?;
    let last = segment.last()?;
    let n = segment.len() as f64;

    let mut bbox = BoundingBox {
        start: first.timestamp,
        end: last.timestamp,
        samples: segment.len(),
        min_lat: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        min_lon: f64::INFINITY,
        max_lon: f64::NEG_INFINITY,
        mean_lat: 0.0,
        mean_lon: 0.0,
    };
    for p in segment {
        bbox.min_lat = bbox.min_lat.min(p.latitude_deg);
        bbox.max_lat = bbox.max_lat.max(p.latitude_deg);
        bbox.min_lon = bbox.min_lon.min(p.longitude_deg);
        bbox.max_lon = bbox.max_lon.max(p.longitude_deg);
        bbox.mean_lat += p.latitude_deg / n;
        bbox.mean_lon += p.longitude_deg / n;
    }
    Some(bbox)
}

/// Ground-track boxes for one satellite, propagated from its element set at the grid start.
pub fn ground_track_boxes(history: &SatelliteHistory, grid: &TimeGrid) -> Option<GroundTrackBoxes> {
    let state = history.state_at(grid.start())?;
    let propagator = match Propagator::new(state) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("Cannot build ground track for {}: {}", history.norad_id(), e);
            return None;
        }
    };
    let (track, skipped_samples) = ground_track(&propagator, grid);
    Some(GroundTrackBoxes {
        norad_id: history.norad_id(),
        name: history.name().map(str::to_string),
        sample_count: track.len(),
        skipped_samples,
        boxes: bounding_boxes(&track),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{parse_element_set, split_element_sets, MeanMotionBounds};
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn track(lons: &[f64]) -> Vec<GroundTrackPoint> {
        lons.iter()
            .enumerate()
            .map(|(i, lon)| GroundTrackPoint {
                timestamp: at(i as i64 * 15),
                latitude_deg: i as f64,
                longitude_deg: *lon,
            })
            .collect()
    }

    #[test]
    fn single_segment_without_crossing() {
        let boxes = bounding_boxes(&track(&[82.0, 83.0, 84.0, 83.0]));
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].samples, 4);
        assert_eq!(boxes[0].min_lon, 82.0);
        assert_eq!(boxes[0].max_lon, 84.0);
        assert_eq!(boxes[0].min_lat, 0.0);
        assert_eq!(boxes[0].max_lat, 3.0);
        assert_abs_diff_eq!(boxes[0].mean_lon, 83.0, epsilon = 1e-12);
        assert_eq!(boxes[0].end, at(45));
    }

    #[test]
    fn antimeridian_crossing_splits_the_track() {
        let boxes = bounding_boxes(&track(&[170.0, 175.0, 179.0, -179.0, -175.0]));
        assert_eq!(boxes.len(), 2);
        assert_eq!((boxes[0].min_lon, boxes[0].max_lon), (170.0, 179.0));
        assert_eq!((boxes[1].min_lon, boxes[1].max_lon), (-179.0, -175.0));
        assert_eq!(boxes[1].start, at(45));
        assert!(boxes.iter().all(|b| b.lon_span() < 180.0));
    }

    #[test]
    fn empty_track_has_no_boxes() {
        assert!(bounding_boxes(&[]).is_empty());
    }

    #[test]
    fn geosynchronous_track_stays_in_one_box() {
        let raw = &split_element_sets(include_str!("../../testdata/navic_2024.tle"))[3];
        let state = parse_element_set(raw).unwrap();
        let history = SatelliteHistory::from_states(
            state.norad_id,
            [state],
            MeanMotionBounds { min: 0.9, max: 1.1 },
        );
        let grid = TimeGrid::new(at(12 * 60), Duration::days(1), Duration::minutes(30)).unwrap();
        let boxes = ground_track_boxes(&history, &grid).unwrap();

        assert_eq!(boxes.norad_id, 41241);
        assert_eq!(boxes.sample_count, 49);
        assert_eq!(boxes.skipped_samples, 0);
        assert_eq!(boxes.boxes.len(), 1);
        // IGSO at 29° inclination sweeps a figure-eight about 111.75°E
        let bbox = &boxes.boxes[0];
        assert!(bbox.max_lat > 25.0 && bbox.min_lat < -25.0);
        assert_abs_diff_eq!(bbox.mean_lon, 111.75, epsilon = 3.0);
    }
}
