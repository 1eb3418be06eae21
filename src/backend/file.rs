//! File-system slot backend.
//!
//! Each slot is one file under a directory. Writes go to a sibling temp file
//! that is then renamed over the target, so a reader sees either the old
//! blob or the new one, never a torn write.

use super::StorageBackend;
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for the file backend.
#[derive(Clone, Debug)]
pub struct FileConfig {
    pub dir: PathBuf,
    /// Create `dir` when the backend is opened.
    pub create_dir: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        FileConfig {
            dir: PathBuf::from(".cart"),
            create_dir: true,
        }
    }
}

impl FileConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileConfig {
            dir: dir.into(),
            ..Default::default()
        }
    }

    /// Build from `CART_DIR`, falling back to the default directory.
    pub fn from_env() -> Self {
        match std::env::var("CART_DIR") {
            Ok(dir) if !dir.trim().is_empty() => FileConfig::new(dir),
            _ => FileConfig::default(),
        }
    }
}

/// File-backed slot storage.
///
/// # Example
///
/// ```no_run
/// use cart_kit::backend::{FileBackend, FileConfig, StorageBackend};
///
/// # async fn example() -> cart_kit::Result<()> {
/// let backend = FileBackend::open(FileConfig::new("/var/lib/shop/carts")).await?;
/// backend.set("cart", b"[]".to_vec()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FileBackend {
    dir: Arc<PathBuf>,
}

impl FileBackend {
    /// Open the backend, creating the directory if configured to.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if the directory is missing (and may not
    /// be created) or is not a directory.
    pub async fn open(config: FileConfig) -> Result<Self> {
        if config.create_dir {
            tokio::fs::create_dir_all(&config.dir).await.map_err(|e| {
                Error::ConfigError(format!(
                    "cannot create cart directory {}: {}",
                    config.dir.display(),
                    e
                ))
            })?;
        }

        let meta = tokio::fs::metadata(&config.dir).await.map_err(|e| {
            Error::ConfigError(format!(
                "cart directory {} unavailable: {}",
                config.dir.display(),
                e
            ))
        })?;
        if !meta.is_dir() {
            return Err(Error::ConfigError(format!(
                "{} is not a directory",
                config.dir.display()
            )));
        }

        info!("✓ File backend initialized: {}", config.dir.display());
        Ok(FileBackend {
            dir: Arc::new(config.dir),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `slot`.
    ///
    /// Characters outside `[A-Za-z0-9._-]` map to `_`, so namespaced slots
    /// like `shop:cart` stay inside the directory.
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        let name: String = slot
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.blob", name))
    }
}

impl StorageBackend for FileBackend {
    async fn get(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        let path = self.slot_path(slot);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!("✓ File GET {} -> HIT ({} bytes)", slot, bytes.len());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("✓ File GET {} -> MISS", slot);
                Ok(None)
            }
            Err(e) => Err(Error::BackendError(format!(
                "File read failed for slot {}: {}",
                slot, e
            ))),
        }
    }

    async fn set(&self, slot: &str, value: Vec<u8>) -> Result<()> {
        let path = self.slot_path(slot);
        let tmp = path.with_extension("blob.tmp");

        tokio::fs::write(&tmp, &value).await.map_err(|e| {
            Error::BackendError(format!("File write failed for slot {}: {}", slot, e))
        })?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::BackendError(format!(
                "File rename failed for slot {}: {}",
                slot, e
            )));
        }

        debug!("✓ File SET {} ({} bytes)", slot, value.len());
        Ok(())
    }

    async fn delete(&self, slot: &str) -> Result<()> {
        match tokio::fs::remove_file(self.slot_path(slot)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::BackendError(format!(
                    "File delete failed for slot {}: {}",
                    slot, e
                )))
            }
        }
        debug!("✓ File DELETE {}", slot);
        Ok(())
    }

    async fn exists(&self, slot: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.slot_path(slot)).await?)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(tokio::fs::metadata(self.dir.as_path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn backend() -> (tempfile::TempDir, FileBackend) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::open(FileConfig::new(dir.path()))
            .await
            .expect("Failed to open backend");
        (dir, backend)
    }

    #[tokio::test]
    async fn test_file_backend_set_get() {
        let (_dir, backend) = backend().await;

        backend
            .set("cart", b"[]".to_vec())
            .await
            .expect("Failed to set");
        let value = backend.get("cart").await.expect("Failed to get");

        assert_eq!(value, Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn test_file_backend_miss() {
        let (_dir, backend) = backend().await;
        assert_eq!(backend.get("cart").await.expect("Failed to get"), None);
        assert!(!backend.exists("cart").await.expect("Failed to check"));
    }

    #[tokio::test]
    async fn test_file_backend_delete_is_idempotent() {
        let (_dir, backend) = backend().await;

        backend.set("cart", b"x".to_vec()).await.expect("Failed to set");
        backend.delete("cart").await.expect("Failed to delete");
        backend.delete("cart").await.expect("Failed to delete twice");

        assert_eq!(backend.get("cart").await.expect("Failed to get"), None);
    }

    #[tokio::test]
    async fn test_file_backend_leaves_no_temp_file() {
        let (dir, backend) = backend().await;

        backend.set("cart", b"one".to_vec()).await.expect("Failed to set");
        backend.set("cart", b"two".to_vec()).await.expect("Failed to set");

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .expect("Failed to list dir")
            .map(|e| e.expect("bad entry").file_name())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(
            backend.get("cart").await.expect("Failed to get"),
            Some(b"two".to_vec())
        );
    }

    #[tokio::test]
    async fn test_slot_path_sanitizes_separators() {
        let (dir, backend) = backend().await;

        let path = backend.slot_path("shop/../x:cart");
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.file_name().unwrap(), "shop_.._x_cart.blob");
    }

    #[tokio::test]
    async fn test_open_rejects_missing_dir_without_create() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = FileConfig {
            dir: dir.path().join("absent"),
            create_dir: false,
        };

        let err = FileBackend::open(config).await.unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_dir, backend) = backend().await;
        assert!(backend.health_check().await.expect("Health check failed"));
    }
}
