//! Error types for terrain map generation

use thiserror::Error;

/// Errors that can occur during map generation or graph bookkeeping
///
/// Geometry, search and budget problems never surface here; they degrade to
/// empty or partial results. Only malformed settings, unknown cell ids and
/// misuse of the partition tracker are reported as errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Requested cell ID does not exist
    #[error("cell not found: {0}")]
    CellNotFound(usize),
    /// A partition operation was attempted before `GraphState::initialize`
    #[error("graph state is not initialized")]
    GraphNotInitialized,
    /// Requested partition ID does not exist
    #[error("partition not found: {0}")]
    PartitionNotFound(String),
}

/// Result type alias for terrain operations
pub type Result<T> = std::result::Result<T, TerrainError>;
