use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{ObjectStore, StorageError};

/// Blobs kept on local disk under `root`, served at `public_prefix`.
#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalObjectStore {
    pub fn new<P: Into<PathBuf>>(root: P, public_prefix: &str) -> Self {
        Self { root: root.into(), public_prefix: public_prefix.to_string() }
    }

    pub fn from_config(cfg: &configs::StorageConfig) -> Self {
        Self::new(&cfg.root_dir, &cfg.public_url_prefix)
    }

    /// Disk path for a managed url.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, StorageError> {
        let rel = url
            .strip_prefix(&self.public_prefix)
            .ok_or_else(|| StorageError::Foreign(url.to_string()))?;
        let rel = rel.split(['?', '#']).next().unwrap_or_default();
        let rel_path = Path::new(rel);
        let safe = !rel.is_empty() && rel_path.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::UnsafePath(url.to_string()));
        }
        Ok(self.root.join(rel_path))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let path = self.resolve(url)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path) -> LocalObjectStore {
        LocalObjectStore::new(root, "/uploads/")
    }

    #[test]
    fn resolves_only_managed_relative_paths() {
        let s = store(Path::new("/srv/blobs"));
        assert_eq!(s.resolve("/uploads/a/b.png").unwrap(), PathBuf::from("/srv/blobs/a/b.png"));
        assert_eq!(s.resolve("/uploads/c.png?v=2").unwrap(), PathBuf::from("/srv/blobs/c.png"));
        assert!(matches!(s.resolve("https://cdn.example.com/x.png"), Err(StorageError::Foreign(_))));
        assert!(matches!(s.resolve("/uploads/../etc/passwd"), Err(StorageError::UnsafePath(_))));
        assert!(matches!(s.resolve("/uploads/"), Err(StorageError::UnsafePath(_))));
    }

    #[tokio::test]
    async fn deletes_file_and_tolerates_missing() {
        let root = std::env::temp_dir().join(format!("objstore_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root).await.unwrap();
        fs::write(root.join("x.png"), b"png").await.unwrap();
        let s = store(&root);

        s.delete("/uploads/x.png").await.unwrap();
        assert!(fs::metadata(root.join("x.png")).await.is_err());
        s.delete("/uploads/x.png").await.unwrap();
        let _ = fs::remove_dir_all(&root).await;
    }
}
