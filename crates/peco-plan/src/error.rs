//! Error types for build plan construction.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Fatal, synchronous failures raised while assembling a [`Plan`](crate::Plan).
///
/// A plan is never partially returned: any of these aborts construction.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown stylesheet dialect: {0}")]
    UnknownDialect(String),

    #[error("missing required field: {field}")]
    MissingField {
        field: String,
        hint: Option<String>,
    },

    #[error("alias '{alias}' already resolves to {existing}, cannot remap it to {requested}")]
    AliasCollision {
        alias: String,
        existing: PathBuf,
        requested: PathBuf,
    },

    #[error("duplicate rule key: {0}")]
    DuplicateRule(String),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl ConfigurationError {
    pub(crate) fn missing(field: &str, hint: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    /// Actionable hint for the CLI, when one exists.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::MissingField { hint, .. } => hint.as_deref(),
            Self::UnknownDialect(_) => {
                Some("Supported dialects are css, scss, sass, less and stylus")
            }
            Self::AliasCollision { .. } => {
                Some("Rename the alias in [aliases]; built-in aliases cannot be remapped")
            }
            _ => None,
        }
    }
}

impl From<figment::Error> for ConfigurationError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}
