use thiserror::Error;

use crate::config::ConfigError;
use crate::dop::GridError;
use crate::elements::SourceError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Element source error: {0}")]
    Source(#[from] SourceError),
    #[error("Time grid error: {0}")]
    Grid(#[from] GridError),
    #[error("No element sets loaded for any configured satellite")]
    NoData,
    #[error("Analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
