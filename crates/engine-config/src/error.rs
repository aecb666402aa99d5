use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read configuration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The missing-data threshold is a percentage.
    #[error("Missing-data threshold must be within [0, 100], got {0}")]
    InvalidThreshold(f64),

    #[error("Flatten spec #{0} has an empty field path")]
    EmptyPath(usize),

    #[error("Split spec for `{0}` needs a non-empty separator")]
    MissingSeparator(String),

    #[error("Split spec for `{0}` needs at least one destination field")]
    NoDestinationFields(String),

    #[error("Field `{0}` is flattened more than once")]
    DuplicatePath(String),

    #[error("Invalid API settings: {0}")]
    InvalidApi(String),
}
