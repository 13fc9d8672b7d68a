use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to load {file}: {source}")]
    Load {
        file: &'static str,
        #[source]
        source: config::ConfigError,
    },

    #[error("Invalid {file}: {field} {reason}")]
    Invalid { file: &'static str, field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(file: &'static str, field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { file, field: field.into(), reason: reason.into() }
    }

    /// Dotted path of the offending field, when the error came from validation
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
