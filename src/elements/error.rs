use thiserror::Error;

/// Why a single element set was rejected. The record is skipped, the batch continues.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ElementSetError {
    #[error("malformed element set: expected 2 or 3 lines, got {0}")]
    LineCount(usize),
    #[error("malformed element set: line {line} has {len} columns, expected 69")]
    LineLength { line: u8, len: usize },
    #[error("malformed element set: line {line} contains non-ASCII characters")]
    NonAscii { line: u8 },
    #[error("malformed element set: line {line} does not start with '{line} '")]
    LineNumber { line: u8 },
    #[error("malformed element set: checksum mismatch on line {line} (expected {expected}, found {found})")]
    Checksum { line: u8, expected: u32, found: u32 },
    #[error("malformed element set: catalog numbers differ ({line1} vs {line2})")]
    CatalogMismatch { line1: u32, line2: u32 },
    #[error("malformed element set: field {field} is not numeric: {value:?}")]
    NonNumeric { field: &'static str, value: String },
    #[error("malformed element set: field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("malformed element set: invalid epoch {0:?}")]
    Epoch(String),
    #[error("malformed element set: {0}")]
    Library(String),
}

impl From<sgp4::TleError> for ElementSetError {
    fn from(err: sgp4::TleError) -> Self {
        ElementSetError::Library(err.to_string())
    }
}

impl From<sgp4::ElementsError> for ElementSetError {
    fn from(err: sgp4::ElementsError) -> Self {
        ElementSetError::Library(err.to_string())
    }
}

/// The fetch collaborator failed; distinct from "no data" (an empty list).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("element source not found: {0}")]
    NotFound(String),
    #[error("element source read error: {0}")]
    Read(#[from] std::io::Error),
    #[error("element source decode error in {file}: {message}")]
    Decode { file: String, message: String },
    #[error("gp_history JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
