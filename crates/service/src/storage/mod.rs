//! Object storage behind image urls.
//!
//! Uploads happen outside this server; it only removes blobs once the rows
//! pointing at them are gone. Removal runs after the database commit and a
//! failure is logged and counted, never rolled back.

pub mod local;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

pub use local::LocalObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("url is not managed by this store: {0}")]
    Foreign(String),
    #[error("refusing unsafe object path: {0}")]
    UnsafePath(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Remove the blob behind `url`. A blob that is already gone is not an error.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

/// Delete every blob, awaiting each one. Returns how many failed.
pub async fn cleanup_blobs(store: &dyn ObjectStore, urls: &[String]) -> usize {
    let mut failed = 0;
    for url in urls {
        match store.delete(url).await {
            Ok(()) => debug!(%url, "blob_deleted"),
            Err(StorageError::Foreign(_)) => debug!(%url, "blob_not_managed_skipped"),
            Err(e) => {
                failed += 1;
                common::metrics::BLOB_DELETE_FAILURES_TOTAL.inc();
                warn!(%url, error = %e, "blob_delete_failed");
            }
        }
    }
    failed
}


#[cfg(test)]
mod tests {
    use super::mock::RecordingObjectStore;
    use super::*;

    #[tokio::test]
    async fn cleanup_counts_failures_and_continues() {
        let store = RecordingObjectStore::default();
        store.fail_on("/uploads/b.png");
        let urls = vec!["/uploads/a.png".to_string(), "/uploads/b.png".to_string(), "/uploads/c.png".to_string()];
        let before = common::metrics::BLOB_DELETE_FAILURES_TOTAL.get();
        let failed = cleanup_blobs(&store, &urls).await;
        assert_eq!(failed, 1);
        assert_eq!(store.deleted(), vec!["/uploads/a.png", "/uploads/c.png"]);
        assert!(common::metrics::BLOB_DELETE_FAILURES_TOTAL.get() > before);
    }
}
