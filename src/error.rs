use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for harvest operations.
pub type HarvestResult<T> = Result<T, HarvestError>;

/// The error type for everything the harvest loop can run into.
///
/// Only the configuration and backend variants are fatal; everything else is
/// logged and folded into the outcome of the current iteration.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Failed to enumerate windows: {reason}")]
    WindowEnumeration { reason: String },

    #[error("Could not focus window '{title}': {reason}")]
    Activation { title: String, reason: String },

    #[error("Failed to send {action}: {reason}")]
    Input { action: String, reason: String },

    #[error("Screen capture failed: {reason}")]
    Capture { reason: String },

    #[error("Capture region {width}x{height} at ({x},{y}) is outside every monitor")]
    Geometry {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    #[error("Template not found at {path:?}")]
    TemplateMissing { path: PathBuf },

    #[error("Failed to load template at {path:?}: {source}")]
    TemplateLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid window title pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Input backend unavailable: {reason}")]
    BackendInit { reason: String },
}

impl HarvestError {
    pub fn input(action: impl Into<String>, reason: impl ToString) -> Self {
        HarvestError::Input {
            action: action.into(),
            reason: reason.to_string(),
        }
    }

    pub fn capture(reason: impl ToString) -> Self {
        HarvestError::Capture {
            reason: reason.to_string(),
        }
    }

    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        HarvestError::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
