use crate::api::error::AppError;
use std::path::PathBuf;

use super::{FileStore, StorageCategory};

pub const MSG_NOT_FOUND: &str = "El recurso especificado no existe.";
pub const MSG_GONE: &str = "El recurso especificado ya no está disponible.";
pub const MSG_CORRUPTED: &str = "El recurso especificado se ha corrompido.";

impl FileStore {
    /// Maps a content or name digest to the path of its verified blob.
    pub async fn resolve(
        &self,
        digest: &str,
        category: StorageCategory,
    ) -> Result<PathBuf, AppError> {
        let record = self
            .find_by_digest(digest)
            .await?
            .ok_or_else(|| AppError::NotFound(MSG_NOT_FOUND.to_string()))?;

        let key = category.key(&record.name_digest, &record.extension);
        if !self.storage.file_exists(&key).await? {
            tracing::warn!("Blob missing for stored file {}: {}", record.id, key);
            return Err(AppError::Gone(MSG_GONE.to_string()));
        }

        let actual = match self.storage.content_digest(&key).await {
            Ok(actual) => actual,
            Err(e) if is_not_found(&e) => {
                tracing::warn!("Blob vanished before it could be verified: {}", key);
                return Err(AppError::Gone(MSG_GONE.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if !actual.eq_ignore_ascii_case(&record.content_digest) {
            tracing::error!(
                "Integrity check failed for {}: expected {}, found {}",
                key,
                record.content_digest,
                actual
            );
            return Err(AppError::Internal(MSG_CORRUPTED.to_string()));
        }

        Ok(self.storage.path(&key))
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}
