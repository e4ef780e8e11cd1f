use thiserror::Error;

/// Propagation failed for one sample; the caller treats the sample as missing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropagationError {
    #[error("propagation diverged: {0}")]
    Diverged(String),
    #[error("propagator rejected elements: {0}")]
    Elements(String),
    #[error("timestamp out of range: {0}")]
    Timestamp(String),
}

impl From<sgp4::Error> for PropagationError {
    fn from(err: sgp4::Error) -> Self {
        PropagationError::Diverged(err.to_string())
    }
}

impl From<sgp4::ElementsError> for PropagationError {
    fn from(err: sgp4::ElementsError) -> Self {
        PropagationError::Elements(err.to_string())
    }
}

impl From<sgp4::TleError> for PropagationError {
    fn from(err: sgp4::TleError) -> Self {
        PropagationError::Elements(err.to_string())
    }
}
