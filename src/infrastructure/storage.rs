use crate::config::AppConfig;
use crate::services::storage::LocalStorage;
use std::sync::Arc;
use tracing::info;

/// Prepares the attachment directory tree and hands back the storage
/// service rooted at its absolute path.
pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<LocalStorage>> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let root = tokio::fs::canonicalize(&config.upload_dir).await?;

    info!("📁 Attachment storage: {}", root.display());

    Ok(Arc::new(LocalStorage::new(root, config.max_file_size)))
}
