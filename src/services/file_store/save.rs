use crate::api::error::AppError;
use crate::entities::stored_files;
use crate::services::storage::StagedFile;
use crate::utils::hash::name_digest;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};
use uuid::Uuid;

use super::{FileStore, StorageCategory, is_unique_violation};

pub const MSG_DUPLICATE: &str = "El archivo ya ha sido cargado anteriormente en el servidor.";
pub const MSG_MIME_NOT_ALLOWED: &str =
    "El tipo de archivo no está en la lista de tipos MIME permitidos.";

fn too_large_message(max_size: u64) -> String {
    format!(
        "El archivo excede el tamaño máximo permitido de {} bytes.",
        max_size
    )
}

/// Original extension including the leading dot, or an empty string.
pub fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(Path::new)
        .and_then(|name| name.extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// An upload that passed the size and type checks and sits in staging.
///
/// Nothing is recorded until [`FileStore::commit`]; dropping it discards the bytes.
#[derive(Debug)]
pub struct PendingUpload {
    staged: StagedFile,
    extension: String,
    filename: String,
}

impl PendingUpload {
    pub fn content_digest(&self) -> &str {
        &self.staged.content_digest
    }

    pub fn size(&self) -> u64 {
        self.staged.size
    }
}

impl FileStore {
    /// Stores an upload and returns its name digest, which callers use as the upload token.
    pub async fn save<'a>(
        &self,
        reader: impl AsyncRead + Unpin + Send + 'a,
        declared_size: u64,
        mime_type: Option<&str>,
        filename: &str,
        category: StorageCategory,
    ) -> Result<String, AppError> {
        let pending = self
            .prepare(reader, declared_size, mime_type, filename)
            .await?;
        self.commit(pending, category).await
    }

    /// Checks the declared size and MIME type, then streams the bytes into staging.
    pub async fn prepare<'a>(
        &self,
        reader: impl AsyncRead + Unpin + Send + 'a,
        declared_size: u64,
        mime_type: Option<&str>,
        filename: &str,
    ) -> Result<PendingUpload, AppError> {
        let max_size = self.settings.max_upload_size as u64;
        if declared_size > max_size {
            return Err(AppError::PayloadTooLarge(too_large_message(max_size)));
        }

        match mime_type {
            Some(mime) if self.settings.is_mime_allowed(mime) => {}
            _ => {
                tracing::warn!("Rejected upload {} with MIME type {:?}", filename, mime_type);
                return Err(AppError::UnsupportedMediaType(
                    MSG_MIME_NOT_ALLOWED.to_string(),
                ));
            }
        }

        // Never write more than one byte past the limit, whatever the client declared.
        let limited = reader.take(max_size.saturating_add(1));
        let staged = self.storage.stage(Box::new(limited)).await?;
        if staged.size > max_size {
            return Err(AppError::PayloadTooLarge(too_large_message(max_size)));
        }

        Ok(PendingUpload {
            staged,
            extension: extension_of(filename),
            filename: filename.to_string(),
        })
    }

    /// Rejects duplicates, moves the staged bytes into `category` and records them.
    pub async fn commit(
        &self,
        pending: PendingUpload,
        category: StorageCategory,
    ) -> Result<String, AppError> {
        let PendingUpload {
            staged,
            extension,
            filename,
        } = pending;

        let content_digest = staged.content_digest.clone();
        let name_digest = name_digest(&content_digest);

        if self.find_by_digest(&name_digest).await?.is_some() {
            tracing::info!("Duplicate upload rejected: {}", content_digest);
            return Err(AppError::Conflict(MSG_DUPLICATE.to_string()));
        }

        let key = category.key(&name_digest, &extension);
        self.storage.promote(staged, &key).await?;

        let record = stored_files::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            content_digest: Set(content_digest.clone()),
            name_digest: Set(name_digest.clone()),
            extension: Set(extension),
            created_at: Set(Some(Utc::now())),
        };

        match record.insert(&self.db).await {
            Ok(_) => {
                tracing::info!("Stored {} as {}", filename, key);
                Ok(name_digest)
            }
            Err(e) if is_unique_violation(&e) => {
                // A concurrent upload of the same bytes won the insert. The blob
                // at `key` is byte-identical to the winner's, so it stays.
                tracing::warn!(
                    "Duplicate digest detected during insert (race condition): {}",
                    content_digest
                );
                Err(AppError::Conflict(MSG_DUPLICATE.to_string()))
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete_file(&key).await {
                    tracing::warn!("Failed to remove orphaned blob {}: {}", key, cleanup);
                }
                Err(e.into())
            }
        }
    }
}
