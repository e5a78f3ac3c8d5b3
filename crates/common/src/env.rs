//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::warn;

/// Ensure the blob storage directory exists; warn when it had to be created.
pub async fn ensure_env(storage_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(storage_dir).await.is_err() {
        warn!(%storage_dir, "storage directory not found; creating it, existing image urls may 404");
    }
    tokio::fs::create_dir_all(storage_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {storage_dir}: {e}"))?;
    Ok(())
}
