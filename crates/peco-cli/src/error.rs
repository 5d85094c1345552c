//! CLI error types and their diagnostic rendering.

use std::path::PathBuf;

use peco_plan::ConfigurationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Plan construction or config loading failed
    #[error(transparent)]
    Config(#[from] ConfigurationError),

    #[error("Directory not found: {}", .0.display())]
    DirNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Development server errors, with their context chain
    #[error("Server error: {0:#}")]
    Server(#[from] anyhow::Error),
}

/// Convert a CLI error to a miette report, carrying over any hint.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match &err {
        CliError::Config(config) => match config.hint() {
            Some(hint) => miette::miette!(help = hint.to_string(), "{}", config),
            None => miette::miette!("{}", config),
        },
        CliError::DirNotFound(_) => {
            miette::miette!(help = "Pass the project directory with --dir", "{}", err)
        }
        _ => miette::miette!("{}", err),
    }
}
