//! Station-keeping and coverage analysis for the NavIC / IRNSS constellation.

pub mod analysis;
pub mod config;
pub mod dop;
pub mod drift;
pub mod elements;
pub mod health;
pub mod maneuver;
pub mod propagate;
