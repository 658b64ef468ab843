use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::time::timeout;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Evidence file store.
///
/// Accepts uploaded bytes and persists them under the uploads directory
/// with a unique, timestamp-prefixed name; the movement history only ever
/// stores the returned relative reference, never the bytes.
#[derive(Debug, Clone)]
pub struct EvidenceStore {
    root: PathBuf,
}

impl EvidenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Stores `bytes` and returns the relative reference (e.g.
    /// `uploads/1700000000000-1a2b3c4d.jpg`) to record as evidence.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let unique = Uuid::new_v4().simple().to_string();
        let file_name = format!("{}-{}{}", Utc::now().timestamp_millis(), &unique[..8], ext);

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ServiceError::StorageFailure(format!("create uploads dir: {}", e)))?;

        let path = self.root.join(&file_name);
        match timeout(WRITE_TIMEOUT, fs::write(&path, bytes)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ServiceError::StorageFailure(format!(
                    "write evidence file: {}",
                    e
                )))
            }
            Err(_) => {
                return Err(ServiceError::StorageFailure(
                    "evidence file write timed out".to_string(),
                ))
            }
        }

        Ok(format!("uploads/{}", file_name))
    }

    /// Removes a previously stored file, best-effort. Used to clean up
    /// when the operation the upload belonged to is rejected.
    #[instrument(skip(self))]
    pub async fn discard(&self, reference: &str) {
        let file_name = reference.strip_prefix("uploads/").unwrap_or(reference);
        let path = self.root.join(file_name);
        if let Err(err) = fs::remove_file(&path).await {
            warn!("could not discard evidence file {}: {}", path.display(), err);
        }
    }

    /// Filesystem directory the relative references resolve into.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
