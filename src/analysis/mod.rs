//! Per-satellite analysis and the constellation-wide runs behind the CLI.

mod error;
mod runner;
mod satellite;
mod types;

pub use error::AnalysisError;
pub use runner::{analyze_constellation, load_histories, run_dop};
pub use satellite::{analyze_history, analyze_satellite};
pub use types::{AnalysisStatus, DopReport, HealthReport, Report, SatelliteReport};
