//! Error types for the CLI

use async_runtime::RuntimeError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The event loop could not finish a scenario
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Writing to the console failed
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering a JSON line failed
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
