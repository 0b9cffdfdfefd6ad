//! Local filesystem storage
//!
//! Raw uploads live in one directory, PDF renditions produced by the
//! converter in another (by default nested inside the first). Names are
//! flat: two owners uploading the same filename share one path on disk.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::core::config::StorageConfig;
use crate::core::error::AppError;
use crate::shared::filename::is_single_component;

/// Which of the two storage directories a file lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    /// Files exactly as the client uploaded them
    Uploads,
    /// PDFs produced by the image converter
    Converted,
}

/// Local disk storage for uploads and converted output
pub struct LocalStorage {
    upload_dir: PathBuf,
    converted_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            upload_dir: config.upload_dir,
            converted_dir: config.converted_dir,
        }
    }

    /// Create both storage directories if they don't exist yet
    pub async fn ensure_directories(&self) -> Result<(), AppError> {
        for dir in [&self.upload_dir, &self.converted_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                AppError::Internal(format!(
                    "Failed to create storage directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        info!(
            "Local storage ready: uploads={}, converted={}",
            self.upload_dir.display(),
            self.converted_dir.display()
        );
        Ok(())
    }

    fn dir(&self, area: StorageArea) -> &Path {
        match area {
            StorageArea::Uploads => &self.upload_dir,
            StorageArea::Converted => &self.converted_dir,
        }
    }

    /// Path of a flat file name inside a storage area
    ///
    /// Returns `None` when the name would escape the directory.
    pub fn path_of(&self, area: StorageArea, name: &str) -> Option<PathBuf> {
        is_single_component(name).then(|| self.dir(area).join(name))
    }

    /// Write a file into a storage area, replacing any file with the same name
    ///
    /// # Arguments
    /// * `area` - Target directory
    /// * `name` - Already sanitized file name
    /// * `data` - The file content as bytes
    ///
    /// # Returns
    /// The size of the file on disk in bytes
    pub async fn write(&self, area: StorageArea, name: &str, data: &[u8]) -> Result<u64, AppError> {
        let path = self
            .path_of(area, name)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid file name '{}'", name)))?;

        fs::write(&path, data).await?;
        let size = fs::metadata(&path).await?.len();

        debug!("Stored '{}' ({} bytes)", path.display(), size);
        Ok(size)
    }

    /// Read a whole file from a storage area
    pub async fn read(&self, area: StorageArea, name: &str) -> Result<Vec<u8>, AppError> {
        let path = self
            .path_of(area, name)
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a regular file exists in a storage area
    pub async fn exists(&self, area: StorageArea, name: &str) -> bool {
        match self.path_of(area, name) {
            Some(path) => is_file(&path).await,
            None => false,
        }
    }

    /// Delete a file, treating an already missing file as success
    ///
    /// Other I/O failures are logged and swallowed.
    pub async fn remove_if_exists(&self, area: StorageArea, name: &str) {
        let Some(path) = self.path_of(area, name) else {
            return;
        };

        match fs::remove_file(&path).await {
            Ok(()) => debug!("Removed '{}'", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove '{}': {}", path.display(), e),
        }
    }

    /// Resolve a download path, looking in converted output first and then
    /// in raw uploads.
    ///
    /// # Arguments
    /// * `relative` - Client supplied path, may contain sub directories
    ///
    /// # Returns
    /// The first existing file, or `None` when absent from both areas or
    /// when the path tries to leave the storage directories
    pub async fn resolve_download(&self, relative: &str) -> Option<PathBuf> {
        let relative = safe_relative_path(relative)?;

        for area in [StorageArea::Converted, StorageArea::Uploads] {
            let candidate = self.dir(area).join(&relative);
            if is_file(&candidate).await {
                return Some(candidate);
            }
        }

        None
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Accept only plain relative paths made of normal components
fn safe_relative_path(relative: &str) -> Option<PathBuf> {
    if relative.is_empty() || relative.contains('\\') || relative.contains('\0') {
        return None;
    }

    let path = Path::new(relative);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (!clean.as_os_str().is_empty()).then_some(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(root: &TempDir) -> LocalStorage {
        LocalStorage::new(StorageConfig {
            upload_dir: root.path().join("uploads"),
            converted_dir: root.path().join("uploads").join("converted"),
        })
    }

    #[tokio::test]
    async fn test_write_reports_size_and_overwrites() {
        let root = TempDir::new().unwrap();
        let storage = storage(&root);
        storage.ensure_directories().await.unwrap();

        assert_eq!(storage.write(StorageArea::Uploads, "a.txt", b"hello").await.unwrap(), 5);
        assert_eq!(storage.write(StorageArea::Uploads, "a.txt", b"hi").await.unwrap(), 2);
        assert_eq!(storage.read(StorageArea::Uploads, "a.txt").await.unwrap(), b"hi");
    }

    #[tokio::test]
    async fn test_write_rejects_path_like_names() {
        let root = TempDir::new().unwrap();
        let storage = storage(&root);
        storage.ensure_directories().await.unwrap();

        let err = storage
            .write(StorageArea::Uploads, "../escape.txt", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(!root.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let root = TempDir::new().unwrap();
        let storage = storage(&root);
        storage.ensure_directories().await.unwrap();

        let err = storage.read(StorageArea::Uploads, "nope.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_if_exists_tolerates_missing_files() {
        let root = TempDir::new().unwrap();
        let storage = storage(&root);
        storage.ensure_directories().await.unwrap();

        storage.write(StorageArea::Uploads, "gone.txt", b"x").await.unwrap();
        storage.remove_if_exists(StorageArea::Uploads, "gone.txt").await;
        storage.remove_if_exists(StorageArea::Converted, "gone.txt").await;
        assert!(!storage.exists(StorageArea::Uploads, "gone.txt").await);
    }

    #[tokio::test]
    async fn test_resolve_download_prefers_converted() {
        let root = TempDir::new().unwrap();
        let storage = storage(&root);
        storage.ensure_directories().await.unwrap();

        storage.write(StorageArea::Uploads, "doc.pdf", b"raw").await.unwrap();
        assert_eq!(
            storage.resolve_download("doc.pdf").await,
            Some(root.path().join("uploads").join("doc.pdf"))
        );

        storage.write(StorageArea::Converted, "doc.pdf", b"converted").await.unwrap();
        assert_eq!(
            storage.resolve_download("doc.pdf").await,
            Some(root.path().join("uploads").join("converted").join("doc.pdf"))
        );
    }

    #[tokio::test]
    async fn test_resolve_download_allows_sub_paths() {
        let root = TempDir::new().unwrap();
        let storage = storage(&root);
        storage.ensure_directories().await.unwrap();

        storage.write(StorageArea::Converted, "scan.pdf", b"pdf").await.unwrap();
        assert!(storage.resolve_download("converted/scan.pdf").await.is_some());
    }

    #[tokio::test]
    async fn test_resolve_download_blocks_traversal() {
        let root = TempDir::new().unwrap();
        let storage = storage(&root);
        storage.ensure_directories().await.unwrap();
        std::fs::write(root.path().join("secret.txt"), b"top secret").unwrap();

        assert_eq!(storage.resolve_download("../secret.txt").await, None);
        assert_eq!(storage.resolve_download("converted/../../secret.txt").await, None);
        assert_eq!(storage.resolve_download("/etc/passwd").await, None);
        assert_eq!(storage.resolve_download("").await, None);
    }

    #[tokio::test]
    async fn test_resolve_download_ignores_directories() {
        let root = TempDir::new().unwrap();
        let storage = storage(&root);
        storage.ensure_directories().await.unwrap();

        assert_eq!(storage.resolve_download("converted").await, None);
    }
}
