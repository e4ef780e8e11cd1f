use serde::{Deserialize, Serialize};

// WGS-84
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.006_694_379_990_14;

/// Fixed geographic observer used for visibility and DOP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundPoint {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_m: f64,
}

impl GroundPoint {
    pub fn new(name: impl Into<String>, latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            name: name.into(),
            latitude_deg,
            longitude_deg,
            altitude_m: 0.0,
        }
    }

    /// Parse `"lat, lon"`.
    pub fn from_coordinates(name: &str, coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() < 2 {
            return None;
        }
        let lat = parts[0].parse().ok()?;
        let lon = parts[1].parse().ok()?;
        Some(Self {
            name: name.to_string(),
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_m: altitude_m.unwrap_or(0.0),
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        [
            (n + alt_km) * cos_lat * lon.cos(),
            (n + alt_km) * cos_lat * lon.sin(),
            (n * (1.0 - WGS84_E2) + alt_km) * sin_lat,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parses_coordinates() {
        let p = GroundPoint::from_coordinates("Delhi", "28.7, 77.1", Some(216.0)).unwrap();
        assert_eq!(p.name, "Delhi");
        assert_abs_diff_eq!(p.latitude_deg, 28.7);
        assert_abs_diff_eq!(p.longitude_deg, 77.1);
        assert_abs_diff_eq!(p.altitude_m, 216.0);
        assert!(GroundPoint::from_coordinates("x", "28.7", None).is_none());
        assert!(GroundPoint::from_coordinates("x", "north, east", None).is_none());
    }

    #[test]
    fn ecef_on_equator_and_pole() {
        let equator = GroundPoint::new("eq", 0.0, 0.0).position_ecef_km();
        assert_abs_diff_eq!(equator[0], WGS84_A_KM, epsilon = 1e-9);
        assert_abs_diff_eq!(equator[1], 0.0, epsilon = 1e-9);

        let pole = GroundPoint::new("np", 90.0, 0.0).position_ecef_km();
        assert_abs_diff_eq!(pole[2], 6356.752, epsilon = 1e-3);
    }
}
