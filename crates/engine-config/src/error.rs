use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating engine settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// An env file line that is not `KEY=VALUE`.
    #[error("Invalid env file: {message} at line {line}")]
    EnvFile { line: usize, message: String },

    #[error("Invalid value '{value}' for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("formula_max_depth must be greater than zero")]
    ZeroDepth,

    #[error("formula_max_depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: usize, max: usize },

    #[error("Unknown default timezone: {0}")]
    UnknownTimezone(String),
}
