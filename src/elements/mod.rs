mod error;
mod history;
mod parsing;
mod source;
mod types;

pub use error::{ElementSetError, SourceError};
pub use history::{MeanMotionBounds, SatelliteHistory, SkippedRecord};
pub(crate) use history::{mean, sample_std};
pub use parsing::{checksum, parse_element_set, parse_tle, parse_tle_lines, split_element_sets};
pub use source::{DirectorySource, ElementSetSource, GpHistorySource, GpRecord};
pub use types::{OrbitalState, RawElementSet, EARTH_EQUATORIAL_RADIUS_KM, MU_KM3_S2};
