//! Storage provider trait for the case file tree.
//!
//! Every path passed to a provider is relative to the provider's root
//! directory and uses `/` as separator.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for file storage backends holding case folders.
///
/// The local filesystem implementation lives in `casehub-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider root is present and usable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write bytes to a file, creating missing parent directories.
    /// Returns the number of bytes written.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<u64>;

    /// Read at most `len` bytes from the start of a file.
    async fn read_prefix(&self, path: &str, len: usize) -> AppResult<Bytes>;

    /// Delete a file. Returns `false` when the file was already absent.
    async fn delete(&self, path: &str) -> AppResult<bool>;

    /// Delete a directory and all its contents. Absent directories are ignored.
    async fn delete_dir(&self, path: &str) -> AppResult<()>;

    /// Copy a file. Returns the number of bytes copied.
    async fn copy(&self, from: &str, to: &str) -> AppResult<u64>;

    /// Atomically rename a file within the provider.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Check whether a file or directory exists.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Check whether `path` is a regular file. Absent paths and
    /// directories yield `false`.
    async fn is_file(&self, path: &str) -> AppResult<bool>;

    /// Create a single directory level. An existing directory is not an error.
    /// Returns `true` when the directory was created by this call.
    async fn create_dir(&self, path: &str) -> AppResult<bool>;

    /// Remove a directory only if it is empty.
    /// Returns `true` when removed, `false` when absent or not empty.
    async fn remove_dir_if_empty(&self, path: &str) -> AppResult<bool>;
}
