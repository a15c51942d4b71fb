//! Storage backend implementation.

use bytes::Bytes;
use mediabox_core::path::relative;
use mediabox_core::storage::MediaStorage;
use opendal::{Operator, services};

use crate::TRACING_TARGET;
use crate::config::{BackendType, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Unified storage backend that wraps OpenDAL operators.
///
/// Accepts the backend-neutral paths produced by `mediabox_core::path` and
/// maps them onto operator paths relative to the configured root.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: StorageConfig,
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let operator = Self::create_operator(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = %config.backend_type,
            root = %config.root,
            "Storage backend initialized"
        );

        Ok(Self { operator, config })
    }

    /// Creates an in-memory backend, mostly useful for tests.
    pub fn memory() -> StorageResult<Self> {
        Self::new(StorageConfig::memory())
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the backend type.
    pub fn backend_type(&self) -> BackendType {
        self.config.backend_type
    }

    /// Reads a file from storage.
    pub async fn read_bytes(&self, path: &str) -> StorageResult<Bytes> {
        let data = self.operator.read(relative(path)).await?.to_bytes();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "File read complete"
        );

        Ok(data)
    }

    /// Writes data to a file in storage.
    pub async fn write(&self, path: &str, data: Bytes) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "Writing file"
        );

        self.operator.write(relative(path), data).await?;
        Ok(())
    }

    /// Deletes a file, treating a missing file as deleted.
    pub async fn remove(&self, path: &str) -> StorageResult<()> {
        match self.operator.delete(relative(path)).await.map_err(StorageError::from) {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    path = %path,
                    "File already absent"
                );
            }
            Err(err) => return Err(err),
        }

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            "File deleted"
        );

        Ok(())
    }

    /// Recursively deletes a directory, treating a missing one as deleted.
    pub async fn remove_directory(&self, path: &str) -> StorageResult<()> {
        let directory = format!("{}/", relative(path).trim_end_matches('/'));
        if directory == "/" {
            return Err(StorageError::init("refusing to delete the storage root"));
        }

        match self.operator.remove_all(&directory).await.map_err(StorageError::from) {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            "Directory deleted"
        );

        Ok(())
    }

    /// Checks if a file exists.
    pub async fn contains(&self, path: &str) -> StorageResult<bool> {
        Ok(self.operator.exists(relative(path)).await?)
    }

    /// Gets metadata for a file.
    pub async fn stat(&self, path: &str) -> StorageResult<FileMetadata> {
        let meta = self.operator.stat(relative(path)).await?;

        Ok(FileMetadata {
            size: meta.content_length(),
            content_type: meta.content_type().map(|s| s.to_string()),
        })
    }

    /// Returns the public URL of a path.
    ///
    /// Without a configured public base the path itself is returned, which
    /// resolves relative to the serving host.
    pub fn public_url(&self, path: &str) -> String {
        let path = format!("/{}", relative(path));
        match self.config.public_url.as_deref() {
            Some(base) => format!("{}{path}", base.trim_end_matches('/')),
            None => path,
        }
    }

    /// Creates an OpenDAL operator based on configuration.
    fn create_operator(config: &StorageConfig) -> StorageResult<Operator> {
        match config.backend_type {
            BackendType::Memory => {
                let builder = services::Memory::default().root(&config.root);

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(feature = "fs")]
            BackendType::Fs => {
                let builder = services::Fs::default().root(&config.root);

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(feature = "s3")]
            BackendType::S3 => {
                let mut builder = services::S3::default().bucket(&config.root);

                if let Some(ref region) = config.region {
                    builder = builder.region(region);
                }

                if let Some(ref endpoint) = config.endpoint {
                    builder = builder.endpoint(endpoint);
                }

                if let Some(ref access_key_id) = config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }

                if let Some(ref secret_access_key) = config.secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            // Reached when the crate was built without the backend's feature.
            #[allow(unreachable_patterns)]
            _ => Err(StorageError::init(format!(
                "Backend type {} is not supported with current features",
                config.backend_type
            ))),
        }
    }
}

#[async_trait::async_trait]
impl MediaStorage for StorageBackend {
    async fn put(&self, path: &str, data: Bytes) -> mediabox_core::Result<()> {
        Ok(self.write(path, data).await?)
    }

    async fn read(&self, path: &str) -> mediabox_core::Result<Bytes> {
        Ok(self.read_bytes(path).await?)
    }

    async fn size(&self, path: &str) -> mediabox_core::Result<i64> {
        let size = self.stat(path).await?.size;
        i64::try_from(size)
            .map_err(|_| StorageError::TooLarge(path.to_owned()).into())
    }

    async fn delete(&self, path: &str) -> mediabox_core::Result<()> {
        Ok(self.remove(path).await?)
    }

    async fn delete_directory(&self, path: &str) -> mediabox_core::Result<()> {
        Ok(self.remove_directory(path).await?)
    }

    async fn exists(&self, path: &str) -> mediabox_core::Result<bool> {
        Ok(self.contains(path).await?)
    }

    fn url(&self, path: &str) -> String {
        self.public_url(path)
    }
}

/// File metadata.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes.
    pub size: u64,
    /// Content type / MIME type.
    pub content_type: Option<String>,
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("backend_type", &self.config.backend_type)
            .field("root", &self.config.root)
            .finish()
    }
}
