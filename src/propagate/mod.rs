mod error;
mod ground_point;
mod propagation;

pub use error::PropagationError;
pub use ground_point::GroundPoint;
pub use propagation::{
    ecef_to_enu, ecef_to_geodetic, look_angles, look_angles_from_ecef, propagate,
    teme_to_ecef_position, LookAngles, Propagator, SatellitePosition,
};
