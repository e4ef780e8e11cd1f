use nalgebra::{Matrix4, RowVector4};

use super::types::{DopUnavailable, DopValues};
use crate::propagate::LookAngles;

/// Fewest satellites for a position + clock solution.
pub const MIN_SATELLITES: usize = 4;
const SINGULAR_DETERMINANT: f64 = 1e-9;

/// One row of the geometry matrix: east/north/up line-of-sight and clock.
pub fn design_row(angles: &LookAngles) -> RowVector4<f64> {
    let az = angles.azimuth_deg.to_radians();
    let el = angles.elevation_deg.to_radians();
    RowVector4::new(el.cos() * az.sin(), el.cos() * az.cos(), el.sin(), 1.0)
}

/// HᵀH for the given lines of sight.
pub fn normal_matrix(angles: &[LookAngles]) -> Matrix4<f64> {
    angles.iter().map(design_row).fold(Matrix4::zeros(), |acc, row| {
        acc + row.transpose() * row
    })
}

/// DOP from the diagonal of (HᵀH)⁻¹.
pub fn compute_dop(angles: &[LookAngles]) -> Result<DopValues, DopUnavailable> {
    if angles.len() < MIN_SATELLITES {
        return Err(DopUnavailable::TooFewSatellites);
    }

    let normal = normal_matrix(angles);
    if normal.determinant().abs() < SINGULAR_DETERMINANT {
        return Err(DopUnavailable::SingularGeometry);
    }
    let q = normal
        .try_inverse()
        .ok_or(DopUnavailable::SingularGeometry)?;

    let diag = [q[(0, 0)], q[(1, 1)], q[(2, 2)], q[(3, 3)]];
    if diag.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return Err(DopUnavailable::SingularGeometry);
    }

    Ok(DopValues {
        gdop: (diag[0] + diag[1] + diag[2] + diag[3]).sqrt(),
        pdop: (diag[0] + diag[1] + diag[2]).sqrt(),
        hdop: (diag[0] + diag[1]).sqrt(),
        vdop: diag[2].sqrt(),
        tdop: diag[3].sqrt(),
    })
}
