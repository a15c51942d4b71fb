//! Byte-storage backend abstraction.

use std::sync::Arc;

use bytes::Bytes;

use crate::Result;

/// Shared, type-erased storage handle.
pub type SharedStorage = Arc<dyn MediaStorage>;

/// Path-addressed byte storage.
///
/// Paths are backend-neutral: forward slashes, rooted at `/`, as produced by
/// [`combine`](crate::path::combine).
#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// Writes bytes at a path, replacing existing content.
    async fn put(&self, path: &str, data: Bytes) -> Result<()>;

    /// Reads the bytes stored at a path.
    async fn read(&self, path: &str) -> Result<Bytes>;

    /// Returns the size in bytes of the object at a path.
    async fn size(&self, path: &str) -> Result<i64>;

    /// Deletes the object at a path. A missing object is not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Recursively deletes a directory. A missing directory is not an error.
    async fn delete_directory(&self, path: &str) -> Result<()>;

    /// Returns whether an object exists at a path.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Returns the external URL of a path.
    fn url(&self, path: &str) -> String;
}
