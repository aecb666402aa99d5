use thiserror::Error;

/// Raised when a raw search response does not have the expected top-level shape.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResponseError {
    #[error("Malformed response: missing top-level key `{0}`")]
    MissingKey(&'static str),

    #[error("Malformed response: `{key}` should be {expected}")]
    InvalidShape { key: String, expected: &'static str },
}
