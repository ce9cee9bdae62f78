use crate::config::Settings;
use crate::services::storage::LocalStorageService;
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Prepares the storage root and returns the local storage backend.
pub async fn setup_storage(settings: &Settings) -> anyhow::Result<Arc<LocalStorageService>> {
    let root = &settings.storage_root;
    tokio::fs::create_dir_all(root)
        .await
        .with_context(|| format!("failed to create storage root {}", root.display()))?;

    info!("💾 Local Storage: {}", root.display());

    Ok(Arc::new(LocalStorageService::new(root.clone())))
}
