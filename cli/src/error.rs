//! Error types for the kardex reporting tool

use std::path::PathBuf;

use thiserror::Error;

/// Tool error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] validator::ValidationErrors),

    #[error("Data file not found: {}", .0.display())]
    MissingDataFile(PathBuf),

    #[error(transparent)]
    Engine(#[from] shared::EngineError),
}

/// Result type alias for settings and data loading
pub type CliResult<T> = Result<T, CliError>;
