use crate::utils::hash::{content_digest_from_reader, copy_with_digest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncRead;

/// Directory (relative to the storage root) that holds in-flight uploads.
pub const STAGING_DIR: &str = ".staging";

/// Bytes written to a private temporary directory, with their digest.
///
/// Dropping a `StagedFile` removes the temporary directory, so an upload that
/// fails or is cancelled never leaves anything behind.
#[derive(Debug)]
pub struct StagedFile {
    pub content_digest: String,
    pub size: u64,
    path: PathBuf,
    _dir: TempDir,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Streams `reader` into staging, hashing it in the same pass.
    async fn stage<'a>(&self, reader: Box<dyn AsyncRead + Unpin + Send + 'a>)
    -> Result<StagedFile>;
    /// Moves a staged file to `key`, creating parent directories as needed.
    async fn promote(&self, staged: StagedFile, key: &str) -> Result<PathBuf>;
    async fn delete_file(&self, key: &str) -> Result<()>;
    async fn file_exists(&self, key: &str) -> Result<bool>;
    /// Re-hashes the stored bytes at `key`.
    async fn content_digest(&self, key: &str) -> Result<String>;
    fn path(&self, key: &str) -> PathBuf;
    async fn is_available(&self) -> bool;
}

pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn staging_root(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn stage<'a>(
        &self,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<StagedFile> {
        let staging_root = self.staging_root();
        tokio::fs::create_dir_all(&staging_root)
            .await
            .with_context(|| format!("failed to create {}", staging_root.display()))?;

        let dir = tempfile::Builder::new()
            .prefix("upload-")
            .tempdir_in(&staging_root)
            .context("failed to create staging directory")?;
        let path = dir.path().join("blob");

        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("failed to create {}", path.display()))?;
        let (content_digest, size) = copy_with_digest(reader, &mut file).await?;
        file.sync_all().await?;

        tracing::debug!("Staged {} bytes at {}", size, path.display());

        Ok(StagedFile {
            content_digest,
            size,
            path,
            _dir: dir,
        })
    }

    async fn promote(&self, staged: StagedFile, key: &str) -> Result<PathBuf> {
        let target = self.path(key);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        // Staging lives under the same root, so this is a same-filesystem rename.
        tokio::fs::rename(staged.path(), &target)
            .await
            .with_context(|| {
                format!(
                    "failed to move {} to {}",
                    staged.path().display(),
                    target.display()
                )
            })?;

        Ok(target)
    }

    async fn delete_file(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn file_exists(&self, key: &str) -> Result<bool> {
        match tokio::fs::metadata(self.path(key)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn content_digest(&self, key: &str) -> Result<String> {
        let file = tokio::fs::File::open(self.path(key)).await?;
        Ok(content_digest_from_reader(file).await?)
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash::content_digest;

    #[tokio::test]
    async fn test_stage_and_promote() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(root.path());

        let staged = storage.stage(Box::new(&b"slide bytes"[..])).await.unwrap();
        assert_eq!(staged.size, 11);
        assert_eq!(staged.content_digest, content_digest(b"slide bytes"));

        let path = storage
            .promote(staged, "uploads/slides/abc.png")
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"slide bytes");
        assert!(storage.file_exists("uploads/slides/abc.png").await.unwrap());
        assert_eq!(
            storage
                .content_digest("uploads/slides/abc.png")
                .await
                .unwrap(),
            content_digest(b"slide bytes")
        );
    }

    #[tokio::test]
    async fn test_dropped_stage_is_cleaned_up() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(root.path());

        let staged = storage.stage(Box::new(&b"abandoned"[..])).await.unwrap();
        let staged_path = staged.path().to_path_buf();
        assert!(staged_path.exists());

        drop(staged);
        assert!(!staged_path.exists());
        let leftovers = std::fs::read_dir(root.path().join(STAGING_DIR))
            .unwrap()
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(root.path());
        assert!(!storage.file_exists("uploads/slides/none.png").await.unwrap());
        storage.delete_file("uploads/slides/none.png").await.unwrap();
        assert!(storage.is_available().await);
    }
}
