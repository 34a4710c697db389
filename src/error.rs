// src/error.rs

//! Error types shared by the whole crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading recipes and resolving option settings
#[derive(Debug, Error)]
pub enum Error {
    #[error("The option setting item {path} does not exist as part of the {recipe} recipe")]
    SettingNotFound { recipe: String, path: String },

    #[error("{0}")]
    ValidationFailed(String),

    #[error("Invalid value for {path}: expected {expected}, {reason}")]
    InvalidValue {
        path: String,
        expected: String,
        reason: String,
    },

    #[error("{0}")]
    ConfigurationNeedsAdjustment(String),

    #[error("{0}")]
    DeserializationFailed(String),

    #[error("The deployment settings file located at {} doesn't exist", .0.display())]
    SettingsFileNotFound(PathBuf),

    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error came from path resolution
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::SettingNotFound { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, Error>;
