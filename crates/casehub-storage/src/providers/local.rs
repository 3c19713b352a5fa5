//! Local filesystem storage provider.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_core::traits::storage::StorageProvider;

/// Storage provider rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a provider rooted at `root_path`, creating the directory if
    /// needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a relative storage path to a path under the root.
    ///
    /// Parent-directory and absolute components are rejected so that no
    /// caller-supplied path can escape the root.
    pub fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let mut full = self.root.clone();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => full.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(AppError::validation(format!(
                        "Path escapes storage root: {path}"
                    )));
                }
            }
        }
        Ok(full)
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

fn io_err(action: &str, path: &str, e: std::io::Error) -> AppError {
    if e.kind() == IoErrorKind::NotFound {
        AppError::not_found(format!("Path not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {path}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<u64> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data)
            .await
            .map_err(|e| io_err("write file", path, e))?;

        debug!(path, bytes = data.len(), "Wrote file");
        Ok(data.len() as u64)
    }

    async fn read_prefix(&self, path: &str, len: usize) -> AppResult<Bytes> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| io_err("open file", path, e))?;

        let mut buf = Vec::with_capacity(len);
        file.take(len as u64)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| io_err("read file", path, e))?;
        Ok(Bytes::from(buf))
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "Deleted file");
                Ok(true)
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err("delete file", path, e)),
        }
    }

    async fn delete_dir(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_dir_all(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err("delete directory", path, e)),
        }
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<u64> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        self.ensure_parent(&to_path).await?;

        fs::copy(&from_path, &to_path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(format!("Path not found: {from}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to copy {from} -> {to}"),
                    e,
                )
            }
        })
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        self.ensure_parent(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(format!("Path not found: {from}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to rename {from} -> {to}"),
                    e,
                )
            }
        })
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path)
            .await
            .map_err(|e| io_err("stat", path, e))
    }

    async fn is_file(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        match fs::symlink_metadata(&full_path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err("stat", path, e)),
        }
    }

    async fn create_dir(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        match fs::create_dir(&full_path).await {
            Ok(()) => {
                debug!(path, "Created directory");
                Ok(true)
            }
            Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                let is_dir = fs::metadata(&full_path)
                    .await
                    .map(|m| m.is_dir())
                    .unwrap_or(false);
                if is_dir {
                    Ok(false)
                } else {
                    Err(AppError::storage(format!(
                        "Cannot create directory, a file is in the way: {path}"
                    )))
                }
            }
            Err(e) => Err(io_err("create directory", path, e)),
        }
    }

    async fn remove_dir_if_empty(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        if full_path == self.root {
            return Ok(false);
        }
        match fs::remove_dir(&full_path).await {
            Ok(()) => {
                debug!(path, "Removed empty directory");
                Ok(true)
            }
            Err(e)
                if matches!(
                    e.kind(),
                    IoErrorKind::NotFound | IoErrorKind::DirectoryNotEmpty
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(io_err("remove directory", path, e)),
        }
    }
}
