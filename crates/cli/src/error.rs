use connectors::{error::ApiError, file::csv::error::FileError};
use engine_config::error::SettingsError;
use engine_processing::transform::error::TransformError;
use model::records::error::ResponseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Missing credential: set {0} in the environment or a .env file")]
    MissingCredential(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Pipeline failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Malformed search response: {0}")]
    Response(#[from] ResponseError),

    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Unknown facet `{0}`")]
    UnknownFacet(String),
}
