//! Content-addressed storage for uploaded assets.
//!
//! Files are keyed by the SHA-256 of their bytes and written to
//! `<category>/<name digest><extension>`. A byte-identical second upload is
//! rejected, and every read re-hashes the blob to detect on-disk corruption.

use crate::config::Settings;
use crate::entities::{prelude::*, *};
use crate::services::storage::StorageService;
use crate::utils::hash::is_content_digest;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr};
use std::sync::Arc;

pub mod resolve;
pub mod save;

pub use save::PendingUpload;

/// Logical bucket an upload belongs to. Each maps to a fixed directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageCategory {
    Slides,
}

impl StorageCategory {
    pub fn segments(&self) -> &'static [&'static str] {
        match self {
            StorageCategory::Slides => &["uploads", "slides"],
        }
    }

    pub fn dir(&self) -> String {
        self.segments().join("/")
    }

    /// Storage key of a blob within this category.
    pub fn key(&self, name_digest: &str, extension: &str) -> String {
        format!("{}/{}{}", self.dir(), name_digest, extension)
    }
}

pub struct FileStore {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
    settings: Settings,
}

impl FileStore {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, settings: Settings) -> Self {
        Self {
            db,
            storage,
            settings,
        }
    }

    /// Finds a record by either digest. 64 hex characters are treated as a
    /// content digest, anything else as a name digest. Matching ignores case.
    pub async fn find_by_digest(
        &self,
        digest: &str,
    ) -> Result<Option<stored_files::Model>, DbErr> {
        let digest = digest.trim().to_lowercase();
        let column = if is_content_digest(&digest) {
            stored_files::Column::ContentDigest
        } else {
            stored_files::Column::NameDigest
        };

        StoredFiles::find()
            .filter(column.eq(digest))
            .one(&self.db)
            .await
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    let msg = err.to_string().to_lowercase();
    msg.contains("23505") || msg.contains("2067") || msg.contains("unique constraint")
}
