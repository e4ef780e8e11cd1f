use chrono::{DateTime, Utc};
use serde::Serialize;
use sgp4::{Constants, Elements};

use super::error::PropagationError;
use super::ground_point::{GroundPoint, WGS84_A_KM, WGS84_E2};
use crate::elements::OrbitalState;

const GEODETIC_ITERATIONS: usize = 6;

/// Earth-fixed position of a satellite at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct SatellitePosition {
    pub timestamp: DateTime<Utc>,
    pub ecef_km: [f64; 3],
    pub latitude_deg: f64,
    /// In (-180, 180].
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Satellite as seen from a ground point.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LookAngles {
    /// Clockwise from north, in [0, 360).
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// SGP4/SDP4 propagator seeded from one element set.
pub struct Propagator {
    norad_id: u32,
    elements: Elements,
    constants: Constants,
}

impl Propagator {
    pub fn new(state: &OrbitalState) -> Result<Self, PropagationError> {
        let (line1, line2) = state.lines();
        let elements = Elements::from_tle(state.name.clone(), line1.as_bytes(), line2.as_bytes())?;
        let constants = Constants::from_elements(&elements)?;
        Ok(Self {
            norad_id: state.norad_id,
            elements,
            constants,
        })
    }

    pub fn norad_id(&self) -> u32 {
        self.norad_id
    }

    pub fn position(&self, timestamp: DateTime<Utc>) -> Result<SatellitePosition, PropagationError> {
        let ecef_km = self.position_ecef_km(timestamp)?;
        let (latitude_deg, longitude_deg, altitude_km) = ecef_to_geodetic(ecef_km);
        Ok(SatellitePosition {
            timestamp,
            ecef_km,
            latitude_deg,
            longitude_deg,
            altitude_km,
        })
    }

    pub fn look_angles(
        &self,
        point: &GroundPoint,
        timestamp: DateTime<Utc>,
    ) -> Result<LookAngles, PropagationError> {
        let sat_ecef = self.position_ecef_km(timestamp)?;
        Ok(look_angles_from_ecef(point, sat_ecef))
    }

    fn position_ecef_km(&self, timestamp: DateTime<Utc>) -> Result<[f64; 3], PropagationError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| PropagationError::Timestamp(e.to_string()))?;

        let prediction = self.constants.propagate(minutes)?;

        let sidereal = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(
            &timestamp.naive_utc(),
        ));
        let ecef = teme_to_ecef_position(prediction.position, sidereal);

        if ecef.iter().any(|v| !v.is_finite()) {
            return Err(PropagationError::Diverged(format!(
                "non-finite position for {} at {}",
                self.norad_id, timestamp
            )));
        }
        Ok(ecef)
    }
}

/// Position of `state` at `timestamp`.
pub fn propagate(
    state: &OrbitalState,
    timestamp: DateTime<Utc>,
) -> Result<SatellitePosition, PropagationError> {
    Propagator::new(state)?.position(timestamp)
}

/// Azimuth, elevation and range of `state` seen from `point` at `timestamp`.
pub fn look_angles(
    state: &OrbitalState,
    point: &GroundPoint,
    timestamp: DateTime<Utc>,
) -> Result<LookAngles, PropagationError> {
    Propagator::new(state)?.look_angles(point, timestamp)
}

pub fn look_angles_from_ecef(point: &GroundPoint, sat_ecef: [f64; 3]) -> LookAngles {
    let sta_ecef = point.position_ecef_km();
    let dr = [
        sat_ecef[0] - sta_ecef[0],
        sat_ecef[1] - sta_ecef[1],
        sat_ecef[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let enu = ecef_to_enu(dr, point.lat_rad(), point.lon_rad());
    let azimuth_deg = enu.0.atan2(enu.1).to_degrees().rem_euclid(360.0);
    let elevation_deg = if range_km > 0.0 {
        (enu.2 / range_km).clamp(-1.0, 1.0).asin().to_degrees()
    } else {
        0.0
    };

    LookAngles {
        azimuth_deg,
        elevation_deg,
        range_km,
    }
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

/// WGS-84 geodetic latitude, longitude (degrees) and height (km).
pub fn ecef_to_geodetic(ecef: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = ecef;
    let lon = y.atan2(x);
    let p = (x * x + y * y).sqrt();

    if p < 1e-9 {
        let b = WGS84_A_KM * (1.0 - WGS84_E2).sqrt();
        return (90f64.copysign(z), lon.to_degrees(), z.abs() - b);
    }

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    let mut height = 0.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        height = p / lat.cos() - n;
        lat = z.atan2(p * (1.0 - WGS84_E2 * n / (n + height)));
    }

    (lat.to_degrees(), lon.to_degrees(), height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{parse_element_set, split_element_sets};
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone};

    const NAVIC: &str = include_str!("../../testdata/navic_2024.tle");

    fn state(index: usize) -> OrbitalState {
        parse_element_set(&split_element_sets(NAVIC)[index]).unwrap()
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn geodetic_round_trip() {
        let point = GroundPoint {
            name: "Kibithu".into(),
            latitude_deg: 28.0,
            longitude_deg: 97.0,
            altitude_m: 1500.0,
        };
        let (lat, lon, h) = ecef_to_geodetic(point.position_ecef_km());
        assert_abs_diff_eq!(lat, 28.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lon, 97.0, epsilon = 1e-9);
        assert_abs_diff_eq!(h, 1.5, epsilon = 1e-6);
    }

    #[test]
    fn zenith_satellite_has_ninety_degree_elevation() {
        let point = GroundPoint::new("eq", 0.0, 83.0);
        let up = point.position_ecef_km();
        let sat = [up[0] * 6.0, up[1] * 6.0, up[2] * 6.0];
        let angles = look_angles_from_ecef(&point, sat);
        assert_abs_diff_eq!(angles.elevation_deg, 90.0, epsilon = 1e-6);
        assert_abs_diff_eq!(angles.range_km, WGS84_A_KM * 5.0, epsilon = 1e-6);
    }

    #[test]
    fn azimuth_points_north_and_east() {
        let point = GroundPoint::new("eq", 0.0, 0.0);
        let north = look_angles_from_ecef(&point, [WGS84_A_KM, 0.0, 1000.0]);
        assert_abs_diff_eq!(north.azimuth_deg, 0.0, epsilon = 1e-9);
        let east = look_angles_from_ecef(&point, [WGS84_A_KM, 1000.0, 0.0]);
        assert_abs_diff_eq!(east.azimuth_deg, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn geostationary_satellite_stays_over_its_slot() {
        // IRNSS-1C, nominal slot 83°E, inclination 5°
        let propagator = Propagator::new(&state(1)).unwrap();
        for hours in [0, 6, 12, 18, 24] {
            let pos = propagator.position(epoch() + Duration::hours(hours)).unwrap();
            assert_abs_diff_eq!(pos.altitude_km, 35_786.0, epsilon = 100.0);
            assert!(pos.latitude_deg.abs() <= 5.5, "latitude {}", pos.latitude_deg);
            assert_abs_diff_eq!(pos.longitude_deg, 83.0, epsilon = 2.0);
        }
    }

    #[test]
    fn navic_satellites_visible_from_delhi() {
        let delhi = GroundPoint::new("Delhi", 28.7, 77.1);
        for index in 0..7 {
            let angles = look_angles(&state(index), &delhi, epoch()).unwrap();
            assert!(angles.elevation_deg > 5.0, "satellite {} at {:?}", index, angles);
            assert!(angles.range_km > 35_000.0 && angles.range_km < 42_000.0);
        }
    }
}
