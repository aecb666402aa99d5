use crate::{api::params::SearchParams, error::ApiError, file::csv::error::FileError};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::info;

/// Anything that answers a search with a raw response payload.
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search(&self, params: &SearchParams) -> Result<JsonValue, ApiError>;

    /// Ends the session and forgets anything tied to it.
    async fn logout(&self) {}
}

/// Replays a raw search response saved on disk, whatever the parameters.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<JsonValue, ApiError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    FileError::NotFound(self.path.display().to_string())
                }
                _ => FileError::IoError(e),
            })?;
        let payload = serde_json::from_str(&raw).map_err(|e| {
            FileError::InvalidFormat(format!("{}: {e}", self.path.display()))
        })?;
        info!("Loaded saved response from {}", self.path.display());
        Ok(payload)
    }
}

#[async_trait]
impl SearchSource for FileSource {
    async fn search(&self, _params: &SearchParams) -> Result<JsonValue, ApiError> {
        self.load().await
    }
}
